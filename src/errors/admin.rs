//! Admin panel error types
//!
//! Two variants are deliberately hard failures: an edit of a record created by
//! someone else, and a display column whose foreign key no longer resolves.
//! Both point at a bug or at corrupted data and must not be softened into a
//! default value.

use thiserror::Error;

use super::CheckTaskError;

#[derive(Error, Debug)]
pub enum AdminError {
    /// Form input failed validation; nothing was written
    #[error("{0}")]
    Validation(String),

    /// The record does not exist
    #[error("{view} {id} not found")]
    NotFound { view: &'static str, id: i32 },

    /// The view has no such picker
    #[error("{view} has no picker named {field}")]
    UnknownPicker { view: &'static str, field: String },

    /// The view does not offer this action (e.g. create on session answers)
    #[error("{action} is not allowed on {view}")]
    ActionNotAllowed {
        view: &'static str,
        action: &'static str,
    },

    /// An attempt to edit a record created by another user
    #[error("You are not allowed to edit this record. ({view} {id})")]
    ForeignEdit { view: &'static str, id: i32 },

    /// A display column could not resolve its reference
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// Submission to the grading service failed
    #[error(transparent)]
    CheckTask(#[from] CheckTaskError),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl AdminError {
    /// Hard failures are logged at error level and surface as such
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AdminError::ForeignEdit { .. } | AdminError::Integrity(_) | AdminError::Database(_)
        )
    }

    /// Get HTTP status code for this error
    pub fn http_status_code(&self) -> u16 {
        match self {
            AdminError::Validation(_) => 422,
            AdminError::NotFound { .. } | AdminError::UnknownPicker { .. } => 404,
            AdminError::ActionNotAllowed { .. } => 405,
            AdminError::ForeignEdit { .. } => 403,
            AdminError::CheckTask(_) => 502,
            AdminError::Integrity(_) | AdminError::Database(_) => 500,
        }
    }
}
