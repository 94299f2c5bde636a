use crate::api::TransportResponse;
use serde_json::Value;
use std::fmt;

/// Reason reported when a backend record lacks the token or identification.
pub const MISSING_REQUIRED_FIELDS: &str = "missing required fields";

#[derive(Debug)]
pub enum AuthError {
    /// The record handed to restore/authenticate is missing required fields.
    Validation(String),
    /// Non-ok backend response, carrying its decoded body.
    Rejected {
        status: u16,
        body: Value,
    },
    /// Non-ok backend response, surfaced whole (`reject_with_full_response`).
    RejectedResponse(TransportResponse),
    /// The network capability itself failed.
    Transport(reqwest::Error),
    NotAuthenticated,
    Store(String),
    ConfigError(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    YamlError(serde_yaml::Error),
    Other(String),
}

impl AuthError {
    pub fn missing_required_fields() -> Self {
        AuthError::Validation(MISSING_REQUIRED_FIELDS.to_string())
    }

    /// Short reason suitable for session events and user-facing output.
    pub fn reason(&self) -> String {
        match self {
            AuthError::Rejected { body, .. } => match body {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            },
            other => other.to_string(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            AuthError::Rejected { status, body } => {
                write!(f, "Backend rejected request (status {}): {}", status, body)
            }
            AuthError::RejectedResponse(response) => write!(
                f,
                "Backend rejected request (status {}): {}",
                response.status(),
                response.text()
            ),
            AuthError::Transport(e) => write!(f, "Network error: {}", e),
            AuthError::NotAuthenticated => write!(f, "Session is not authenticated"),
            AuthError::Store(msg) => write!(f, "Store error: {}", msg),
            AuthError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AuthError::IoError(e) => write!(f, "IO error: {}", e),
            AuthError::JsonError(e) => write!(f, "JSON error: {}", e),
            AuthError::YamlError(e) => write!(f, "YAML error: {}", e),
            AuthError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Transport(e) => Some(e),
            AuthError::IoError(e) => Some(e),
            AuthError::JsonError(e) => Some(e),
            AuthError::YamlError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Transport(err)
    }
}

impl From<std::io::Error> for AuthError {
    fn from(err: std::io::Error) -> Self {
        AuthError::IoError(err)
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::JsonError(err)
    }
}

impl From<serde_yaml::Error> for AuthError {
    fn from(err: serde_yaml::Error) -> Self {
        AuthError::YamlError(err)
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::ConfigError(format!("{:#}", err))
    }
}

impl From<String> for AuthError {
    fn from(msg: String) -> Self {
        AuthError::Other(msg)
    }
}

impl From<&str> for AuthError {
    fn from(msg: &str) -> Self {
        AuthError::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
