use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("validation failed: {message}")]
    Validation { message: String },
    #[error("settings path `{path}` {reason}")]
    SettingsPath { path: String, reason: &'static str },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn settings_path(path: &[String], reason: &'static str) -> Self {
        Self::SettingsPath {
            path: path.join("."),
            reason,
        }
    }
}
