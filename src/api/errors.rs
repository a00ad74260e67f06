//! Error types for talking to the catalog API

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unable to reach the server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error (status {status}): {}", message.as_deref().unwrap_or("no message"))]
    Status {
        status: u16,
        message: Option<String>,
    },

    #[error("Unexpected status {actual} (expected {expected})")]
    UnexpectedStatus {
        expected: u16,
        actual: u16,
    },

    #[error("Failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Expected a JSON {expected} in the response body")]
    UnexpectedBody {
        expected: &'static str,
    },

    #[error("Session storage error: {0}")]
    Session(#[from] std::io::Error),
}

impl ApiError {
    /// Message the server attached to a failed response, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// True when no response was received at all
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// Server message when present, otherwise the given fallback
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

/// Client-side validation failure, raised before any request is made
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
