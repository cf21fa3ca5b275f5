//! Error types for the admin API client.
//!
//! Every failed call surfaces as a [`ClientError`]. Callers that need to decide
//! how to present a failure should go through [`ClientError::class`], which maps
//! each variant onto the three classes the console distinguishes.

use serde::Deserialize;
use thiserror::Error;

/// How a failure should be presented to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Expected absence; shown as an empty state, not as an error
    NotFound,
    /// Transport or server failure; shown with a retry option
    NetworkOrServer,
    /// Rejected locally before any request was sent
    Validation,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Server returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("{0}")]
    Validation(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Build the error for a non-2xx response from its status and raw body
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| fallback_message(status, body));
        if status == 404 {
            ClientError::NotFound { message }
        } else {
            ClientError::Http { status, message }
        }
    }

    pub fn decode(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        ClientError::Decode {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            ClientError::NotFound { .. } => ErrorClass::NotFound,
            ClientError::Validation(_) => ErrorClass::Validation,
            ClientError::Http { .. }
            | ClientError::Network(_)
            | ClientError::Decode { .. }
            | ClientError::Config(_) => ErrorClass::NetworkOrServer,
        }
    }

    /// HTTP status of the failed response, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::NotFound { .. } => Some(404),
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether repeating the same call could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self.class(), ErrorClass::NetworkOrServer)
            && !matches!(self, ClientError::Config(_))
    }
}

/// Error envelopes the backend is known to send
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorEnvelope {
    Nested { error: ErrorBody },
    Message { message: String },
    Plain { error: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_message(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let message = match envelope {
        ErrorEnvelope::Nested { error } => error.message,
        ErrorEnvelope::Message { message } => message,
        ErrorEnvelope::Plain { error } => error,
    };
    let message = message.trim().to_string();
    (!message.is_empty()).then_some(message)
}

fn fallback_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() || body.starts_with('<') {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Request failed")
            .to_string()
    } else {
        body.chars().take(200).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_known_envelopes() {
        let nested = ClientError::from_response(
            409,
            r#"{"error": {"code": "conflict", "message": "Prompt already exists"}}"#,
        );
        assert_eq!(nested.to_string(), "Server returned 409: Prompt already exists");

        let flat = ClientError::from_response(400, r#"{"message": "Bad page"}"#);
        assert_eq!(flat.status(), Some(400));
        assert!(flat.to_string().contains("Bad page"));

        let plain = ClientError::from_response(401, r#"{"error": "Unauthorized"}"#);
        assert!(plain.to_string().contains("Unauthorized"));
    }

    #[test]
    fn test_fallback_message() {
        let html = ClientError::from_response(502, "<html>bad gateway</html>");
        assert_eq!(html.to_string(), "Server returned 502: Bad Gateway");

        let empty = ClientError::from_response(500, "");
        assert_eq!(empty.to_string(), "Server returned 500: Internal Server Error");

        let text = ClientError::from_response(503, "maintenance window");
        assert!(text.to_string().ends_with("maintenance window"));
    }

    #[test]
    fn test_not_found_is_its_own_class() {
        let err = ClientError::from_response(404, r#"{"message": "No prompt found"}"#);
        assert!(matches!(err, ClientError::NotFound { .. }));
        assert_eq!(err.class(), ErrorClass::NotFound);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_classes() {
        assert_eq!(
            ClientError::from_response(500, "").class(),
            ErrorClass::NetworkOrServer
        );
        assert!(ClientError::from_response(500, "").is_retryable());
        assert_eq!(
            ClientError::decode("/admin/users", "missing field `users`").class(),
            ErrorClass::NetworkOrServer
        );
        assert_eq!(
            ClientError::Validation("Prompt cannot be empty".into()).class(),
            ErrorClass::Validation
        );
        assert!(!ClientError::Config("bad url".into()).is_retryable());
    }
}
