//! Network document error types

use thiserror::Error;

/// Errors raised while loading or mutating a network document
#[derive(Error, Debug)]
pub enum NetworkError {
    /// The request did not name a network
    #[error("Пропущен параметр GUID. И какую сеть мне открыть?!")]
    MissingGuid,

    /// No network with this GUID, or it belongs to someone else
    #[error("Нет такой сети")]
    NotFound,

    /// The network exists but is neither owned by the caller nor shared
    #[error("Сеть закрыта для общего доступа")]
    AccessDenied,

    /// The stored document is not a JSON object
    #[error("Network document is corrupt: {0}")]
    CorruptDocument(String),

    /// The request body does not have the expected shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl NetworkError {
    /// Soft failures are reported to the user and never escalate
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            NetworkError::MissingGuid | NetworkError::NotFound | NetworkError::AccessDenied
        )
    }

    /// Get HTTP status code for this error on the JSON routes
    pub fn http_status_code(&self) -> u16 {
        match self {
            NetworkError::MissingGuid
            | NetworkError::NotFound
            | NetworkError::AccessDenied
            | NetworkError::InvalidBody(_) => 400,
            NetworkError::CorruptDocument(_) | NetworkError::Database(_) => 500,
        }
    }
}
