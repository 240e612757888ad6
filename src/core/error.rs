use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecognizerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid state: expected {expected}, found {found}")]
    InvalidState {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Feedback ticket for session {0} is no longer pending")]
    StaleFeedback(String),

    #[error("Not a single character: {0:?}")]
    InvalidCharacter(String),

    #[error("Reference database entry is invalid: {0}")]
    InvalidEntry(String),
}

pub type Result<T> = std::result::Result<T, RecognizerError>;
