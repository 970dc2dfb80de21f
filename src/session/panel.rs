use crate::api::types::Flashcard;

/// Where the panel's cards came from. A quiz launched from a "view all"
/// panel takes over the screen; one launched from a single-message preview
/// stays inline with the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelSource {
    Message,
    ViewAll,
}

/// Study-mode state for one set of flashcards: an ordered sequence, a cursor,
/// and which side of the current card is showing. Purely presentational —
/// no network calls happen here.
#[derive(Debug)]
pub struct StudyPanel {
    cards: Vec<Flashcard>,
    cursor: usize,
    revealed: bool,
    source: PanelSource,
}

/// Render snapshot. Everything the terminal needs to draw the panel is a
/// pure function of (cards, cursor, revealed).
#[derive(Debug, PartialEq, Eq)]
pub struct PanelView<'a> {
    /// 1-based position, 0 when the panel is empty.
    pub position: usize,
    pub total: usize,
    pub side_label: &'a str,
    pub text: &'a str,
    pub can_prev: bool,
    pub can_next: bool,
    pub can_flip: bool,
    pub can_quiz: bool,
}

impl StudyPanel {
    pub fn open(cards: Vec<Flashcard>, source: PanelSource) -> Self {
        Self {
            cards,
            cursor: 0,
            revealed: false,
            source,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn revealed(&self) -> bool {
        self.revealed
    }

    pub fn source(&self) -> PanelSource {
        self.source
    }

    /// Step back one card. No-op at the first card; always flips back to the
    /// question side.
    pub fn prev(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.revealed = false;
        }
    }

    /// Step forward one card. No-op at the last card; always flips back to
    /// the question side.
    pub fn next(&mut self) {
        if self.cursor + 1 < self.cards.len() {
            self.cursor += 1;
            self.revealed = false;
        }
    }

    /// Toggle question/answer side. No-op on an empty panel.
    pub fn flip(&mut self) {
        if !self.cards.is_empty() {
            self.revealed = !self.revealed;
        }
    }

    /// Distinct flashcard ids in first-seen order — the payload for quiz
    /// generation.
    pub fn distinct_card_ids(&self) -> Vec<i64> {
        let mut seen = std::collections::HashSet::new();
        self.cards
            .iter()
            .map(|card| card.id)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    pub fn view(&self) -> PanelView<'_> {
        let total = self.cards.len();

        match self.cards.get(self.cursor) {
            None => PanelView {
                position: 0,
                total: 0,
                side_label: "",
                text: "No flashcards found.",
                can_prev: false,
                can_next: false,
                can_flip: false,
                can_quiz: false,
            },
            Some(card) => {
                let (side_label, text) = if self.revealed {
                    ("Answer", card.answer.as_str())
                } else {
                    ("Question", card.question.as_str())
                };

                PanelView {
                    position: self.cursor + 1,
                    total,
                    side_label,
                    text,
                    can_prev: self.cursor > 0,
                    can_next: self.cursor + 1 < total,
                    can_flip: true,
                    can_quiz: true,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn card(id: i64, question: &str, answer: &str) -> Flashcard {
        Flashcard {
            id,
            question: question.to_string(),
            answer: answer.to_string(),
            chat_session_id: Some(1),
            source_message_id: Some(10),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn panel(ids: &[i64]) -> StudyPanel {
        let cards = ids
            .iter()
            .map(|id| card(*id, &format!("Q{id}"), &format!("A{id}")))
            .collect();
        StudyPanel::open(cards, PanelSource::Message)
    }

    #[test]
    fn cursor_stays_in_bounds_under_navigation() {
        let mut p = panel(&[1, 2, 3]);

        p.prev();
        assert_eq!(p.cursor(), 0, "prev at first card is a no-op");

        p.next();
        p.next();
        p.next();
        p.next();
        assert_eq!(p.cursor(), 2, "next clamps at the last card");

        p.prev();
        assert_eq!(p.cursor(), 1);
    }

    #[test]
    fn navigation_always_resets_revealed() {
        let mut p = panel(&[1, 2]);

        p.flip();
        assert!(p.revealed());
        p.next();
        assert!(!p.revealed(), "next resets to the question side");

        p.flip();
        p.prev();
        assert!(!p.revealed(), "prev resets to the question side");
    }

    #[test]
    fn flip_is_a_noop_on_empty_panel() {
        let mut p = panel(&[]);
        p.flip();
        assert!(!p.revealed());
    }

    #[test]
    fn distinct_ids_dedup_in_first_seen_order() {
        let p = panel(&[3, 1, 3, 2, 1]);
        assert_eq!(p.distinct_card_ids(), vec![3, 1, 2]);
    }

    #[test]
    fn view_shows_position_and_side() {
        let mut p = panel(&[1, 2]);

        let view = p.view();
        assert_eq!(view.position, 1);
        assert_eq!(view.total, 2);
        assert_eq!(view.side_label, "Question");
        assert_eq!(view.text, "Q1");
        assert!(!view.can_prev);
        assert!(view.can_next);

        p.flip();
        let view = p.view();
        assert_eq!(view.side_label, "Answer");
        assert_eq!(view.text, "A1");

        p.next();
        let view = p.view();
        assert_eq!(view.position, 2);
        assert!(view.can_prev);
        assert!(!view.can_next);
    }

    #[test]
    fn empty_panel_disables_everything() {
        let p = panel(&[]);
        let view = p.view();
        assert_eq!(view.position, 0);
        assert_eq!(view.total, 0);
        assert_eq!(view.text, "No flashcards found.");
        assert!(!view.can_prev);
        assert!(!view.can_next);
        assert!(!view.can_flip);
        assert!(!view.can_quiz);
    }
}
