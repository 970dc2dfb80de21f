use thiserror::Error;

/// Failures from the tutoring backend, split the way the UI reacts to them:
/// transport problems get a "check the backend" hint, HTTP errors carry the
/// status plus whatever detail the body had, decode errors mean the backend
/// answered with something we don't understand.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Cannot reach backend at {base}. Start the backend and try again.")]
    Unreachable { base: String },

    #[error("{message}")]
    Status { code: u16, message: String },

    #[error("Failed to decode backend response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Assemble the user-facing message for a non-2xx response:
    /// `Request failed (STATUS).` plus the structured `detail`/`message`/
    /// `error` field from a JSON body, or the raw body text when present.
    pub fn from_status(code: u16, canonical_reason: Option<&str>, body: &str) -> Self {
        let status_text = match canonical_reason {
            Some(reason) => format!("{code} {reason}"),
            None => code.to_string(),
        };
        let prefix = format!("Request failed ({status_text}).");

        let detail = extract_detail(body);
        let message = match detail {
            Some(detail) => format!("{prefix} {detail}"),
            None => prefix,
        };

        ApiError::Status { code, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let text = body.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(payload) = serde_json::from_str::<serde_json::Value>(text) {
        for key in ["detail", "message", "error"] {
            match payload.get(key) {
                Some(serde_json::Value::String(s)) => {
                    if !s.trim().is_empty() {
                        return Some(s.trim().to_string());
                    }
                }
                Some(serde_json::Value::Null) | None => {}
                Some(other) => return Some(other.to_string()),
            }
        }
    }

    Some(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_includes_json_detail() {
        let err = ApiError::from_status(404, Some("Not Found"), r#"{"detail": "User not found"}"#);
        assert_eq!(err.to_string(), "Request failed (404 Not Found). User not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn status_message_falls_back_to_raw_body() {
        let err = ApiError::from_status(500, None, "boom");
        assert_eq!(err.to_string(), "Request failed (500). boom");
    }

    #[test]
    fn status_message_without_body_is_just_prefix() {
        let err = ApiError::from_status(403, Some("Forbidden"), "   ");
        assert_eq!(err.to_string(), "Request failed (403 Forbidden).");
        assert!(err.is_forbidden());
    }

    #[test]
    fn unreachable_mentions_base_url() {
        let err = ApiError::Unreachable {
            base: "http://127.0.0.1:8000".to_string(),
        };
        assert!(err.to_string().contains("http://127.0.0.1:8000"));
        assert_eq!(err.status(), None);
    }
}
