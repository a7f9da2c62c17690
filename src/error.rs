//! Error taxonomy for checklist generation, persistence and export.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChecklistError {
    /// Bad or missing required input (e.g. an empty keyword).
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A research source backend failed or timed out.
    /// The generator absorbs these; they only surface from provider calls.
    #[error("Provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    #[error("Project not found: {id}")]
    NotFound { id: i64 },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChecklistError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for ChecklistError {
    fn from(err: rusqlite::Error) -> Self {
        ChecklistError::Persistence {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ChecklistError {
    fn from(err: serde_json::Error) -> Self {
        ChecklistError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for ChecklistError {
    fn from(err: reqwest::Error) -> Self {
        let provider = err
            .url()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "http".to_string());
        ChecklistError::Provider {
            provider,
            message: format!("HTTP request failed: {}", err),
        }
    }
}

impl From<toml::de::Error> for ChecklistError {
    fn from(err: toml::de::Error) -> Self {
        ChecklistError::Config {
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ChecklistError {
    fn from(err: toml::ser::Error) -> Self {
        ChecklistError::Config {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChecklistError>;
