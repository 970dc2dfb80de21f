pub mod client;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;

use async_trait::async_trait;

use types::{Flashcard, LearningStats, QuizDetail, QuizQuestion};

/// The backend operations the quiz/flashcard session controller consumes.
/// `ApiClient` is the real implementation; tests drive the controller
/// against a scripted mock.
#[async_trait]
pub trait TutorBackend: Send + Sync {
    /// Ordered flashcards for one chat session, optionally active-only.
    async fn chat_flashcards(
        &self,
        user_id: i64,
        chat_session_id: i64,
        only_active: bool,
    ) -> Result<Vec<Flashcard>, ApiError>;

    /// Auto-generate an MCQ quiz from a set of flashcard ids.
    async fn generate_mcq_quiz(
        &self,
        user_id: i64,
        title: &str,
        flashcard_ids: &[i64],
    ) -> Result<QuizDetail, ApiError>;

    /// Submit the selected option text for one question; the echoed record
    /// carries the (possibly server-corrected) answer and correctness.
    async fn submit_answer(
        &self,
        quiz_id: i64,
        question_id: i64,
        user_answer: &str,
    ) -> Result<QuizQuestion, ApiError>;

    /// Overview aggregate, quiz history, and per-flashcard stats.
    async fn learning_stats(&self, user_id: i64) -> Result<LearningStats, ApiError>;
}

#[async_trait]
impl TutorBackend for ApiClient {
    async fn chat_flashcards(
        &self,
        user_id: i64,
        chat_session_id: i64,
        only_active: bool,
    ) -> Result<Vec<Flashcard>, ApiError> {
        ApiClient::chat_flashcards(self, user_id, chat_session_id, only_active).await
    }

    async fn generate_mcq_quiz(
        &self,
        user_id: i64,
        title: &str,
        flashcard_ids: &[i64],
    ) -> Result<QuizDetail, ApiError> {
        ApiClient::create_auto_mcq_quiz(self, user_id, title, flashcard_ids).await
    }

    async fn submit_answer(
        &self,
        quiz_id: i64,
        question_id: i64,
        user_answer: &str,
    ) -> Result<QuizQuestion, ApiError> {
        ApiClient::submit_answer(self, quiz_id, question_id, user_answer).await
    }

    async fn learning_stats(&self, user_id: i64) -> Result<LearningStats, ApiError> {
        ApiClient::learning_stats(self, user_id).await
    }
}
