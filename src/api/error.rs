//! API error types

use super::dto::ServerStatus;
use crate::entity::EntityKind;
use crate::paging::FetchError;
use std::fmt;

/// Errors that can occur talking to the backend
#[derive(Debug)]
pub enum ApiError {
    /// Request never completed (connect, timeout, TLS, ...)
    Network(String),
    /// Non-2xx HTTP status
    Http { status: u16, body: String },
    /// Response body was not the expected JSON
    Decode(String),
    /// Transport succeeded but the status list carries non-OK codes
    Server { statuses: Vec<ServerStatus> },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::Http { status, body } => write!(f, "HTTP {}: {}", status, body),
            Self::Decode(msg) => write!(f, "Malformed response: {}", msg),
            Self::Server { statuses } => {
                let described: Vec<String> = statuses.iter().map(|s| s.describe()).collect();
                write!(f, "Server rejected request: {}", described.join(", "))
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Message for a failed list page
    pub fn list_message(&self, kind: EntityKind) -> String {
        match self {
            Self::Network(_) => "Network error. Please check your connection.".to_string(),
            Self::Server { statuses } => {
                let messages: Vec<&str> = statuses
                    .iter()
                    .filter(|s| !s.is_ok())
                    .map(|s| s.message.as_deref().unwrap_or("Unknown server error"))
                    .collect();
                if messages.is_empty() {
                    format!("Failed to load {}. Please try again.", kind.plural())
                } else {
                    messages.join(", ")
                }
            }
            Self::Http { .. } | Self::Decode(_) => {
                format!("Failed to load {}. Please try again.", kind.plural())
            }
        }
    }

    /// Message for a failed single-entity call
    ///
    /// `action` names what was attempted, e.g. "saving course".
    pub fn user_message(&self, action: &str) -> String {
        match self {
            Self::Network(msg) => format!("Network error: {}", msg),
            Self::Http { status, .. } => {
                format!("Error {} (HTTP {}). Please try again.", action, status)
            }
            Self::Decode(_) => format!("Error {}.", action),
            Self::Server { statuses } => {
                let described: Vec<String> = statuses
                    .iter()
                    .filter(|s| !s.is_ok())
                    .map(|s| s.describe())
                    .collect();
                if described.is_empty() {
                    format!("Error {}.", action)
                } else {
                    described.join("\n")
                }
            }
        }
    }

    pub fn into_fetch_error(self, kind: EntityKind) -> FetchError {
        FetchError::new(self.list_message(kind))
    }
}
