use serde_json::json;
use thiserror::Error;

use optibrain_core::EngineError;

/// Broad class of a failed request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is wrong; resending it unchanged fails the same way.
    Validation,
    /// A collaborator could not be reached; the request may succeed later.
    Unavailable,
}

/// Error surfaced to callers of the decision service.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    kind: ErrorKind,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn malformed(err: serde_json::Error) -> Self {
        Self {
            kind: ErrorKind::Validation,
            code: "malformed_request",
            message: err.to_string(),
        }
    }

    pub fn encoding(err: serde_json::Error) -> Self {
        Self {
            kind: ErrorKind::Validation,
            code: "encoding_failed",
            message: err.to_string(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Unavailable,
            code: "service_unavailable",
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Status an HTTP adapter should answer with.
    pub fn http_status(&self) -> u16 {
        match (self.kind, self.code) {
            (ErrorKind::Unavailable, _) => 503,
            (_, "no_available_node") => 404,
            (_, "invalid_state") => 409,
            (_, "malformed_request") => 400,
            (_, "encoding_failed") => 500,
            _ => 422,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "error": self.code,
            "message": self.message,
        })
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self {
            kind: ErrorKind::Validation,
            code: err.code(),
            message: err.to_string(),
        }
    }
}
