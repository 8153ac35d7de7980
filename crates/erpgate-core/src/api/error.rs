use std::fmt;

use reqwest::{Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// Failure below the HTTP layer: the request never produced a status code.
#[derive(Error, Debug)]
pub enum TransportFailure {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("request timed out: {0}")]
    TimedOut(#[source] reqwest::Error),

    #[error("request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportFailure::TimedOut(err)
        } else {
            TransportFailure::Network(err)
        }
    }
}

/// Diagnostic detail pulled from the Service Layer's `{error: {code, message: {value}}}`
/// envelope. Both parts are optional; an empty detail is not an error in itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteErrorDetail {
    pub code: Option<i64>,
    pub message: Option<String>,
}

impl RemoteErrorDetail {
    /// Best-effort extraction from a failing response body.
    pub fn from_body(body: &str) -> Self {
        if body.trim().is_empty() {
            return Self::default();
        }
        let Ok(doc) = serde_json::from_str::<Value>(body) else {
            return Self::default();
        };
        let Some(err) = doc.get("error") else {
            return Self::default();
        };

        let code = match err.get("code") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        let message = err
            .get("message")
            .and_then(|m| m.get("value"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Self { code, message }
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.message.is_none()
    }
}

impl fmt::Display for RemoteErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.message.as_deref()) {
            (Some(code), Some(msg)) => write!(f, "code {}: {}", code, msg),
            (Some(code), None) => write!(f, "code {}", code),
            (None, Some(msg)) => write!(f, "{}", msg),
            (None, None) => write!(f, "no detail"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Service Layer login failed: {}", describe_login(.status, .remote))]
    LoginFailed {
        status: Option<StatusCode>,
        remote: RemoteErrorDetail,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Service Layer request failed: {method} {path} returned {status} ({remote})")]
    RequestFailed {
        method: Method,
        path: String,
        status: StatusCode,
        remote: RemoteErrorDetail,
        body: String,
    },

    #[error("Service Layer transport failure: {0}")]
    Transport(#[from] TransportFailure),

    #[error("Invalid resource path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Failed to serialize request payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

fn describe_login(status: &Option<StatusCode>, remote: &RemoteErrorDetail) -> String {
    match status {
        Some(status) if remote.is_empty() => format!("status {}", status),
        Some(status) => format!("status {} ({})", status, remote),
        None => "login endpoint unreachable".to_string(),
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ClientError {
    /// Truncate a response body to avoid carrying excessive data around
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub(crate) fn request_failed(method: &Method, path: &str, status: StatusCode, body: &str) -> Self {
        ClientError::RequestFailed {
            method: method.clone(),
            path: path.to_string(),
            status,
            remote: RemoteErrorDetail::from_body(body),
            body: Self::truncate_body(body),
        }
    }

    /// HTTP status reported by the Service Layer, if the failure got that far.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::LoginFailed { status, .. } => *status,
            ClientError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn remote(&self) -> Option<&RemoteErrorDetail> {
        match self {
            ClientError::LoginFailed { remote, .. } | ClientError::RequestFailed { remote, .. } => {
                Some(remote)
            }
            _ => None,
        }
    }

    /// True for a request (not login) that the Service Layer answered with 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::RequestFailed { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Transport(TransportFailure::Cancelled))
    }
}
