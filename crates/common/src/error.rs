use thiserror::Error;

/// Common error types used across the notifier.
#[derive(Debug, Error)]
pub enum HeraldError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

pub type HeraldResult<T> = Result<T, HeraldError>;
