//! Error types for Budgie

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication rejected by AI backend ({status}): {body}")]
    Auth { status: u16, body: String },

    #[error("AI backend error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("AI backend returned an empty response")]
    EmptyResponse,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl Error {
    /// Classify a non-success HTTP status from an AI backend
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Error::Auth { status, body },
            _ => Error::Api { status, body },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
