use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------- Users ----------

#[derive(Debug, Clone, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    /// Only present on `/users/me`; older backends omit it.
    #[serde(default)]
    pub user_role: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn is_admin(&self) -> bool {
        self.user_role
            .as_deref()
            .is_some_and(|r| r.trim().eq_ignore_ascii_case("admin"))
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// ---------- Chat sessions & messages ----------

#[derive(Debug, Clone, Deserialize)]
pub struct ChatSession {
    pub id: i64,
    pub title: Option<String>,
    pub model_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatSession {
    /// Display title, falling back to the numbered default the backend uses.
    pub fn display_title(&self) -> String {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Chat #{}", self.id))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub chat_session_id: i64,
    pub sender_role: String,
    pub content: String,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub evidence_source: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn is_assistant(&self) -> bool {
        self.sender_role == "assistant"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageResult {
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
}

// ---------- Flashcards ----------

/// A question/answer pair the backend generated from an assistant reply.
/// Attempt statistics live server-side; this is a fetched copy.
#[derive(Debug, Clone, Deserialize)]
pub struct Flashcard {
    pub id: i64,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub chat_session_id: Option<i64>,
    #[serde(default)]
    pub source_message_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// ---------- Quizzes ----------

#[derive(Debug, Clone, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub user_id: i64,
    pub title: Option<String>,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub score_percent: f64,
    pub created_at: DateTime<Utc>,
}

/// One labeled MCQ choice as the backend stores it. Malformed entries
/// (missing label or text) deserialize to empty strings and are dropped
/// during normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct McqOption {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct McqOptions {
    #[serde(default)]
    pub options: Vec<McqOption>,
    #[serde(default)]
    pub correct_label: Option<String>,
}

/// Backend record for a quiz question. Also the shape the answer-submission
/// endpoint echoes back with `user_answer`/`is_correct` filled in.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizQuestion {
    pub id: i64,
    pub quiz_id: i64,
    pub flashcard_id: i64,
    pub question_text: String,
    pub correct_answer: String,
    #[serde(default)]
    pub user_answer: Option<String>,
    #[serde(default)]
    pub is_correct: Option<bool>,
    pub order_index: i64,
    #[serde(default)]
    pub mcq_options: Option<McqOptions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizDetail {
    pub quiz: Quiz,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Serialize)]
pub struct QuizCreateRequest {
    pub title: String,
    pub flashcard_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct AnswerRequest {
    pub user_answer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Explanation {
    pub question_id: i64,
    pub explanation: String,
}

// ---------- Learning stats ----------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsOverview {
    #[serde(default)]
    pub total_flashcards: i64,
    #[serde(default)]
    pub total_quizzes: i64,
    #[serde(default)]
    pub avg_quiz_score: Option<f64>,
    #[serde(default)]
    pub last_quiz_score: Option<f64>,
    /// Rolling accuracy over the last 10 answered questions, 0-100.
    #[serde(default)]
    pub accuracy_last_10_questions: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizResult {
    pub quiz_id: i64,
    pub title: Option<String>,
    pub score_percent: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsProgress {
    #[serde(default)]
    pub quizzes: Vec<QuizResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlashcardStats {
    pub flashcard_id: i64,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub total_attempts: i64,
    #[serde(default)]
    pub correct_attempts: i64,
    #[serde(default)]
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// 0-100, absent until the first attempt.
    #[serde(default)]
    pub accuracy: Option<f64>,
}

/// The three stats endpoints bundled: everything the analytics screen and
/// the learning-signal classifier consume.
#[derive(Debug, Clone, Default)]
pub struct LearningStats {
    pub overview: StatsOverview,
    pub quizzes: Vec<QuizResult>,
    pub flashcards: Vec<FlashcardStats>,
}

// ---------- Admin: knowledge sources ----------

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeSource {
    pub id: i64,
    pub title: String,
    pub source_type: String,
    pub source_ref: String,
    pub enabled: bool,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize)]
pub struct KnowledgeSourcePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReindexOutcome {
    pub ok: bool,
    pub message: String,
    pub total_sources: i64,
    pub enabled_sources: i64,
    pub verified_sources: i64,
}
