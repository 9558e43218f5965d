//! Domain-specific error types
//!
//! Each area of the service owns one error enum. The HTTP layer decides how an
//! error reaches the user (flash + redirect, JSON body, or hard failure) from
//! the variant, so the services stay free of response concerns.
//!
//! # Error Categories
//!
//! - **NetworkError**: network document lookups, ownership and mutation
//! - **AdminError**: admin CRUD, pickers, formatters and the check views
//! - **AuthError**: sessions and credentials
//! - **CheckTaskError**: submissions to the external grading service
//!
//! # Examples
//!
//! ```rust
//! use miminet::errors::{AdminError, NetworkError};
//!
//! let err = NetworkError::NotFound;
//! assert!(err.is_soft());
//!
//! let err = AdminError::ForeignEdit { view: "test", id: 7 };
//! assert_eq!(err.http_status_code(), 403);
//! ```

pub mod admin;
pub mod auth;
pub mod check_task;
pub mod network;

pub use admin::AdminError;
pub use auth::AuthError;
pub use check_task::CheckTaskError;
pub use network::NetworkError;

/// Result type alias for network document operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Result type alias for admin operations
pub type AdminResult<T> = Result<T, AdminError>;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type alias for check task submissions
pub type CheckTaskResult<T> = Result<T, CheckTaskError>;
