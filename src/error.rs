use serde::{Deserialize, Serialize};

/// Structured error payload returned by the API on rejected requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub message: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub field_errors: Vec<FieldError>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub object_name: String,
    pub field: String,
    pub message: String,
}

/// A non-2xx response, kept raw so callers can pick how to read it.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedResponse {
    pub status: u16,
    pub body: String,
}

impl FailedResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn structured(&self) -> Option<ErrorBody> {
        serde_json::from_str(&self.body).ok()
    }

    /// Structured body first, then the plain text, then the bare status.
    pub fn message(&self) -> String {
        if let Some(body) = self.structured() {
            return body.message;
        }
        let text = self.body.trim();
        if text.is_empty() {
            format!("request failed with status {}", self.status)
        } else {
            text.to_string()
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("not found")] NotFound,
    #[error("conflict")] Conflict,
    #[error("rejected with status {}", .0.status)] Rejected(FailedResponse),
    #[error("transport: {0}")] Transport(String),
    #[error("decode: {0}")] Decode(String),
    #[error("invalid route parameter `{0}`")] InvalidRoute(String),
}

impl ClientError {
    /// Text suitable for the alert sink.
    pub fn alert_message(&self) -> String {
        match self {
            ClientError::Rejected(resp) => resp.message(),
            other => other.to_string(),
        }
    }

    /// True for the in-memory `NotFound` and for a remote 404, whose body stays in `Rejected`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound | ClientError::Rejected(FailedResponse { status: 404, .. }))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::Conflict | ClientError::Rejected(FailedResponse { status: 409, .. }))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

pub type ServiceResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_body_wins() {
        let r = FailedResponse::new(400, r#"{"message":"error.validation","fieldErrors":[]}"#);
        assert_eq!(r.message(), "error.validation");
        assert_eq!(ClientError::Rejected(r).alert_message(), "error.validation");
    }

    #[test]
    fn falls_back_to_text() {
        let r = FailedResponse::new(502, "Bad Gateway\n");
        assert!(r.structured().is_none());
        assert_eq!(r.message(), "Bad Gateway");
        assert_eq!(FailedResponse::new(500, "").message(), "request failed with status 500");
    }

    #[test]
    fn remote_404_and_409_classify_like_local_errors() {
        let missing = ClientError::Rejected(FailedResponse::new(404, r#"{"message":"error.notfound"}"#));
        assert!(missing.is_not_found());
        assert!(!missing.is_conflict());
        assert_eq!(missing.alert_message(), "error.notfound");
        assert!(ClientError::NotFound.is_not_found());

        assert!(ClientError::Rejected(FailedResponse::new(409, "taken")).is_conflict());
        assert!(ClientError::Conflict.is_conflict());
        assert!(!ClientError::Rejected(FailedResponse::new(400, "")).is_not_found());
        assert!(!ClientError::Transport("reset".into()).is_conflict());
    }
}
