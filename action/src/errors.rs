//! Error types for the deployments action

use thiserror::Error;

/// Main error type for the deployments action
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Remote error: {status} - {message}")]
    RemoteError { status: u16, message: String },

    #[error("unknown step type {0}")]
    UnknownStep(String),

    #[error("unexpected status {0}")]
    ValidationError(String),

    #[error(
        "got a 404 deleting {0}, check that your token has repo scope and that the token user is an admin"
    )]
    MissingEnvironmentAccess(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("{} of {} targets failed: {}", .failures.len(), .total, format_failures(.failures))]
    BatchError {
        total: usize,
        failures: Vec<(String, ActionError)>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ActionError {
    /// Build a configuration error for a missing input
    pub fn missing_input(key: &str) -> Self {
        ActionError::ConfigError(format!("Input required and not supplied: {}", key))
    }

    /// HTTP status of a remote failure, if this is one
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            ActionError::RemoteError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn format_failures(failures: &[(String, ActionError)]) -> String {
    failures
        .iter()
        .map(|(target, err)| format!("[{}] {}", target, err))
        .collect::<Vec<_>>()
        .join("; ")
}
