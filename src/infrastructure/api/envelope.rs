//! Response envelope decoding
//!
//! Every JSON body from the backend is `{ "success": bool, "message"?: str, ... }`
//! with the endpoint's payload as sibling fields.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::application::ports::ApiError;

/// Longest raw body echoed back in an error message
const MAX_ERROR_BODY: usize = 200;

/// How a 401 should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthContext {
    /// Unauthenticated account request (login, registration, reset);
    /// 401 means bad email/password
    Login,
    /// A bearer token was sent; 401 means the token is invalid or expired
    Bearer,
}

#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Envelope {
    /// Decode the payload fields into `T`
    pub fn into_body<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        serde_json::from_value(Value::Object(self.body)).map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// The server message, or `fallback`
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

fn truncate(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_ERROR_BODY {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(MAX_ERROR_BODY).collect();
        format!("{}...", cut)
    }
}

/// Map an HTTP status and raw body to an envelope or a typed error
pub fn decode_envelope(
    status: StatusCode,
    text: &str,
    context: AuthContext,
) -> Result<Envelope, ApiError> {
    let envelope: Option<Envelope> = serde_json::from_str(text).ok();
    let message = envelope
        .as_ref()
        .and_then(|e| e.message.clone())
        .filter(|m| !m.trim().is_empty());

    if status == StatusCode::UNAUTHORIZED {
        return Err(match context {
            AuthContext::Login => ApiError::Rejected(
                message.unwrap_or_else(|| "Invalid email or password".to_string()),
            ),
            AuthContext::Bearer => ApiError::Unauthorized,
        });
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(
            message.unwrap_or_else(|| "resource not found".to_string()),
        ));
    }

    if status.is_server_error() {
        return Err(ApiError::Server {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| truncate(text)),
        });
    }

    if !status.is_success() {
        return Err(match message {
            Some(message) => ApiError::Rejected(message),
            None => ApiError::Server {
                status: status.as_u16(),
                message: truncate(text),
            },
        });
    }

    let envelope = envelope.ok_or_else(|| {
        ApiError::Parse(format!("expected a JSON object, got: {}", truncate(text)))
    })?;

    if envelope.success == Some(false) {
        return Err(ApiError::Rejected(envelope.message_or("Request was rejected")));
    }

    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct JobIdBody {
        job_id: String,
    }

    #[test]
    fn success_body_is_decoded() {
        let envelope = decode_envelope(
            StatusCode::CREATED,
            r#"{"success":true,"message":"Job posting created successfully","job_id":"j1"}"#,
            AuthContext::Bearer,
        )
        .unwrap();
        assert_eq!(envelope.message_or(""), "Job posting created successfully");
        let body: JobIdBody = envelope.into_body().unwrap();
        assert_eq!(body.job_id, "j1");
    }

    #[test]
    fn success_false_is_rejected() {
        let err = decode_envelope(
            StatusCode::OK,
            r#"{"success":false,"message":"Job already saved"}"#,
            AuthContext::Bearer,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref m) if m == "Job already saved"));
    }

    #[test]
    fn unauthorized_with_bearer_means_expired_token() {
        let err = decode_envelope(
            StatusCode::UNAUTHORIZED,
            r#"{"success":false,"message":"Token has expired"}"#,
            AuthContext::Bearer,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(err.to_string(), "Invalid or expired token. Please log in again.");
    }

    #[test]
    fn unauthorized_at_login_keeps_server_message() {
        let err = decode_envelope(
            StatusCode::UNAUTHORIZED,
            r#"{"success":false,"message":"Invalid password"}"#,
            AuthContext::Login,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref m) if m == "Invalid password"));
    }

    #[test]
    fn forbidden_surfaces_message() {
        let err = decode_envelope(
            StatusCode::FORBIDDEN,
            r#"{"success":false,"message":"Only recruiters can create job postings"}"#,
            AuthContext::Bearer,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Only recruiters"));
    }

    #[test]
    fn server_error_with_html_body() {
        let err = decode_envelope(
            StatusCode::BAD_GATEWAY,
            "<html>bad gateway</html>",
            AuthContext::Bearer,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 502, .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn non_json_success_is_parse_error() {
        let err = decode_envelope(StatusCode::OK, "ok", AuthContext::Bearer).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let long = "x".repeat(500);
        assert!(truncate(&long).len() < 210);
    }
}
