//! Errors from the external grading service client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckTaskError {
    /// No check service is reachable
    #[error("Check service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with a non-success status
    #[error("Check service rejected the task with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Transport failure
    #[error("Check service request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
