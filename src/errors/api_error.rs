use crate::errors::ToolError;
use serde_json::Value;
use std::error::Error;
use std::fmt;

pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

/// How a Branch API call failed. `status` doubles as the discriminator at
/// the boundary: present means the server responded, absent means the
/// call never produced a response (or never left the process).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The endpoint returned a non-2xx response.
    Response,
    /// The request failed before any response arrived (timeout, DNS,
    /// connection reset).
    Network,
    /// A precondition was violated before a network call was attempted.
    Caller,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub body: Option<Value>,
}

impl ApiError {
    pub fn caller(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Caller,
            message: message.into(),
            status: None,
            status_text: None,
            body: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: message.into(),
            status: None,
            status_text: None,
            body: None,
        }
    }

    /// Wraps a non-2xx response. The backend's own words win over the
    /// status line, because "Invalid app id" is more actionable than
    /// "404 Not Found": first a nested `error.message`, then whatever
    /// `error_message` extracts (top-level `message` field, plain-text
    /// body), and only then the status line.
    pub fn response(status: u16, status_text: &str, body: Value) -> Self {
        let from_body = body
            .get("error")
            .and_then(|err| err.get("message"))
            .and_then(|msg| msg.as_str())
            .map(|msg| msg.to_string())
            .or_else(|| {
                Some(error_message(&body))
                    .filter(|msg| !msg.is_empty() && msg != UNKNOWN_ERROR_MESSAGE)
            });
        let message = from_body.unwrap_or_else(|| {
            if status_text.is_empty() {
                format!("Request failed with status {}", status)
            } else {
                format!("{} {}", status, status_text)
            }
        });
        Self {
            kind: ApiErrorKind::Response,
            message,
            status: Some(status),
            status_text: Some(status_text.to_string()),
            body: Some(body),
        }
    }
}

/// Extracts a human-readable message from an arbitrary failure payload:
/// a string is used verbatim, an object with a string `message` field
/// yields that field, anything else falls back to a fixed generic
/// message. Never panics.
pub fn error_message(value: &Value) -> String {
    if let Some(text) = value.as_str() {
        return text.to_string();
    }
    if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
        return message.to_string();
    }
    UNKNOWN_ERROR_MESSAGE.to_string()
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ApiError::network("Branch API request timed out");
        }
        ApiError::network(err.to_string())
    }
}

impl From<ApiError> for ToolError {
    fn from(err: ApiError) -> Self {
        let mapped = match err.kind {
            ApiErrorKind::Caller => ToolError::invalid_params(err.message.clone()),
            ApiErrorKind::Network => ToolError::retryable(err.message.clone()),
            ApiErrorKind::Response => {
                let message = err.message.clone();
                match err.status.unwrap_or(0) {
                    400 | 422 => ToolError::invalid_params(message),
                    401 | 403 => ToolError::denied(message),
                    404 => ToolError::not_found(message),
                    408 => ToolError::timeout(message),
                    409 => ToolError::conflict(message),
                    429 => ToolError::retryable(message),
                    status if status >= 500 => ToolError::retryable(message),
                    _ => ToolError::internal(message),
                }
            }
        };
        match err.status {
            Some(status) => mapped.with_details(serde_json::json!({
                "status": status,
                "statusText": err.status_text,
                "body": err.body,
            })),
            None => mapped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ToolErrorKind;

    #[test]
    fn error_message_uses_string_verbatim() {
        assert_eq!(error_message(&Value::String("x".to_string())), "x");
    }

    #[test]
    fn error_message_reads_message_field() {
        let value = serde_json::json!({"message": "x", "code": 17});
        assert_eq!(error_message(&value), "x");
    }

    #[test]
    fn error_message_falls_back_for_everything_else() {
        assert_eq!(error_message(&serde_json::json!(123)), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(error_message(&Value::Null), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(
            error_message(&serde_json::json!({"message": 42})),
            UNKNOWN_ERROR_MESSAGE
        );
    }

    #[test]
    fn response_prefers_nested_error_message() {
        let body = serde_json::json!({"error": {"message": "Invalid app id"}});
        let err = ApiError::response(404, "Not Found", body);
        assert_eq!(err.message, "Invalid app id");
        assert_eq!(err.status, Some(404));
    }

    #[test]
    fn response_reads_top_level_message_field() {
        let body = serde_json::json!({"message": "alias already exists"});
        let err = ApiError::response(409, "Conflict", body);
        assert_eq!(err.message, "alias already exists");
    }

    #[test]
    fn response_uses_plain_text_body_verbatim() {
        let body = Value::String("upstream maintenance window".to_string());
        let err = ApiError::response(503, "Service Unavailable", body);
        assert_eq!(err.message, "upstream maintenance window");
    }

    #[test]
    fn response_without_usable_body_uses_status_line() {
        let err = ApiError::response(404, "Not Found", Value::Null);
        assert_eq!(err.message, "404 Not Found");

        let err = ApiError::response(404, "Not Found", Value::String(String::new()));
        assert_eq!(err.message, "404 Not Found");
    }

    #[test]
    fn network_errors_carry_no_status() {
        let err = ApiError::network("connection reset");
        assert!(err.status.is_none());
        assert_eq!(err.kind, ApiErrorKind::Network);
    }

    #[test]
    fn status_classes_map_to_tool_error_kinds() {
        let denied: ToolError = ApiError::response(401, "Unauthorized", Value::Null).into();
        assert_eq!(denied.kind, ToolErrorKind::Denied);

        let missing: ToolError = ApiError::response(404, "Not Found", Value::Null).into();
        assert_eq!(missing.kind, ToolErrorKind::NotFound);

        let server: ToolError = ApiError::response(503, "Service Unavailable", Value::Null).into();
        assert_eq!(server.kind, ToolErrorKind::Retryable);
        assert!(server.retryable);

        let caller: ToolError = ApiError::caller("Branch Key is not configured").into();
        assert_eq!(caller.kind, ToolErrorKind::InvalidParams);
        assert!(caller.details.is_none());
    }
}
