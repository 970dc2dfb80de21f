//! Flashcard study panel and quiz round state, kept apart from the terminal
//! rendering in `commands`: state transitions live here, the command loops
//! only draw views and relay input.

pub mod error;
pub mod panel;
pub mod quiz;

pub use error::SessionError;
pub use panel::{PanelSource, PanelView, StudyPanel};
pub use quiz::{Advance, AnswerOutcome, ChoiceMark, McqQuestion, QuizRound, QuizSummary};
