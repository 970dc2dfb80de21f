use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{
    AnswerRequest, ChatMessage, ChatSession, Explanation, Flashcard, FlashcardStats,
    KnowledgeSource, KnowledgeSourcePatch, LearningStats, LoginRequest, QuizCreateRequest,
    QuizDetail, QuizQuestion, RegisterRequest, ReindexOutcome, SendMessageResult, StatsOverview,
    StatsProgress, UserAccount,
};

/// HTTP client for the tutoring backend. All endpoints are JSON in/out;
/// the signed-in user id travels in the `X-User-Id` header.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    user_id: Option<i64>,
}

impl ApiClient {
    pub fn new(base_url: &str, user_id: Option<i64>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base_url.trim_end_matches('/').to_string(),
            user_id,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn builder(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base, path);
        let mut request = self
            .http
            .request(method, url)
            .header("Content-Type", "application/json");

        if let Some(user_id) = self.user_id {
            request = request.header("X-User-Id", user_id.to_string());
        }

        request
    }

    /// Send a request and decode the JSON body. `Ok(None)` means the backend
    /// answered 204 or with an empty body — "no data", not an error.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>, ApiError> {
        let response = request.send().await.map_err(|_| ApiError::Unreachable {
            base: self.base.clone(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(
                status.as_u16(),
                status.canonical_reason(),
                &body,
            ));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        self.dispatch(self.builder(Method::GET, path)).await
    }

    async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, ApiError> {
        self.dispatch(self.builder(method, path).json(body)).await
    }

    async fn send_empty<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
    ) -> Result<Option<T>, ApiError> {
        self.dispatch(self.builder(method, path)).await
    }

    fn required<T>(value: Option<T>) -> Result<T, ApiError> {
        value.ok_or_else(|| ApiError::Decode("backend returned an empty body".to_string()))
    }

    // ---------- Users ----------

    pub async fn register(&self, payload: &RegisterRequest) -> Result<UserAccount, ApiError> {
        Self::required(self.send(Method::POST, "/users", payload).await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserAccount, ApiError> {
        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        Self::required(self.send(Method::POST, "/users/login", &payload).await?)
    }

    pub async fn current_user(&self) -> Result<UserAccount, ApiError> {
        Self::required(self.get("/users/me").await?)
    }

    // ---------- Chat sessions ----------

    pub async fn list_chat_sessions(&self, user_id: i64) -> Result<Vec<ChatSession>, ApiError> {
        Ok(self
            .get(&format!("/users/{user_id}/chat-sessions"))
            .await?
            .unwrap_or_default())
    }

    pub async fn create_chat_session(
        &self,
        user_id: i64,
        title: Option<&str>,
    ) -> Result<ChatSession, ApiError> {
        let payload = serde_json::json!({ "title": title });
        Self::required(
            self.send(
                Method::POST,
                &format!("/users/{user_id}/chat-sessions"),
                &payload,
            )
            .await?,
        )
    }

    pub async fn rename_chat_session(
        &self,
        user_id: i64,
        chat_id: i64,
        title: &str,
    ) -> Result<(), ApiError> {
        let payload = serde_json::json!({ "title": title });
        self.send::<serde_json::Value, _>(
            Method::PATCH,
            &format!("/users/{user_id}/chat-sessions/{chat_id}"),
            &payload,
        )
        .await?;
        Ok(())
    }

    pub async fn delete_chat_session(&self, user_id: i64, chat_id: i64) -> Result<(), ApiError> {
        self.send_empty::<serde_json::Value>(
            Method::DELETE,
            &format!("/users/{user_id}/chat-sessions/{chat_id}"),
        )
        .await?;
        Ok(())
    }

    // ---------- Messages ----------

    pub async fn list_messages(
        &self,
        user_id: i64,
        chat_id: i64,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        Ok(self
            .get(&format!("/users/{user_id}/chat-sessions/{chat_id}/messages"))
            .await?
            .unwrap_or_default())
    }

    pub async fn send_message(
        &self,
        user_id: i64,
        chat_id: i64,
        content: &str,
    ) -> Result<SendMessageResult, ApiError> {
        let payload = serde_json::json!({ "content": content });
        Self::required(
            self.send(
                Method::POST,
                &format!("/users/{user_id}/chat-sessions/{chat_id}/messages"),
                &payload,
            )
            .await?,
        )
    }

    // ---------- Flashcards ----------

    pub async fn chat_flashcards(
        &self,
        user_id: i64,
        chat_session_id: i64,
        only_active: bool,
    ) -> Result<Vec<Flashcard>, ApiError> {
        let path = format!(
            "/users/{user_id}/flashcards?chat_session_id={chat_session_id}&only_active={only_active}"
        );
        Ok(self.get(&path).await?.unwrap_or_default())
    }

    pub async fn message_flashcards(
        &self,
        user_id: i64,
        source_message_id: i64,
    ) -> Result<Vec<Flashcard>, ApiError> {
        let path = format!("/users/{user_id}/flashcards?source_message_id={source_message_id}");
        Ok(self.get(&path).await?.unwrap_or_default())
    }

    // ---------- Quizzes ----------

    pub async fn create_auto_mcq_quiz(
        &self,
        user_id: i64,
        title: &str,
        flashcard_ids: &[i64],
    ) -> Result<QuizDetail, ApiError> {
        let payload = QuizCreateRequest {
            title: title.to_string(),
            flashcard_ids: flashcard_ids.to_vec(),
        };
        Self::required(
            self.send(
                Method::POST,
                &format!("/users/{user_id}/quizzes/auto-mcq"),
                &payload,
            )
            .await?,
        )
    }

    pub async fn submit_answer(
        &self,
        quiz_id: i64,
        question_id: i64,
        user_answer: &str,
    ) -> Result<QuizQuestion, ApiError> {
        let payload = AnswerRequest {
            user_answer: user_answer.to_string(),
        };
        Self::required(
            self.send(
                Method::POST,
                &format!("/quizzes/{quiz_id}/questions/{question_id}/answer"),
                &payload,
            )
            .await?,
        )
    }

    pub async fn question_explanation(
        &self,
        user_id: i64,
        question_id: i64,
    ) -> Result<Explanation, ApiError> {
        Self::required(
            self.get(&format!(
                "/users/{user_id}/stats/questions/{question_id}/explanation"
            ))
            .await?,
        )
    }

    // ---------- Learning stats ----------

    pub async fn stats_overview(&self, user_id: i64) -> Result<StatsOverview, ApiError> {
        Ok(self
            .get(&format!("/users/{user_id}/stats/overview"))
            .await?
            .unwrap_or_default())
    }

    pub async fn stats_progress(&self, user_id: i64) -> Result<StatsProgress, ApiError> {
        Ok(self
            .get(&format!("/users/{user_id}/stats/progress"))
            .await?
            .unwrap_or_default())
    }

    pub async fn stats_flashcards(&self, user_id: i64) -> Result<Vec<FlashcardStats>, ApiError> {
        Ok(self
            .get(&format!("/users/{user_id}/stats/flashcards"))
            .await?
            .unwrap_or_default())
    }

    pub async fn learning_stats(&self, user_id: i64) -> Result<LearningStats, ApiError> {
        let overview = self.stats_overview(user_id).await?;
        let progress = self.stats_progress(user_id).await?;
        let flashcards = self.stats_flashcards(user_id).await?;

        Ok(LearningStats {
            overview,
            quizzes: progress.quizzes,
            flashcards,
        })
    }

    // ---------- Admin: knowledge sources ----------

    pub async fn list_knowledge_sources(&self, sync: bool) -> Result<Vec<KnowledgeSource>, ApiError> {
        Ok(self
            .get(&format!("/admin/knowledge-sources?sync={sync}"))
            .await?
            .unwrap_or_default())
    }

    pub async fn update_knowledge_source(
        &self,
        source_id: i64,
        patch: &KnowledgeSourcePatch,
    ) -> Result<KnowledgeSource, ApiError> {
        Self::required(
            self.send(
                Method::PATCH,
                &format!("/admin/knowledge-sources/{source_id}"),
                patch,
            )
            .await?,
        )
    }

    pub async fn reindex_knowledge_sources(&self) -> Result<ReindexOutcome, ApiError> {
        let payload = serde_json::json!({});
        Self::required(
            self.send(Method::POST, "/admin/knowledge-sources/reindex", &payload)
                .await?,
        )
    }
}
