//! Authentication and authorisation error types

use thiserror::Error;

/// Authentication and authorisation errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// No session was presented
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Session id is unknown or was closed
    #[error("Session not found")]
    SessionNotFound,

    /// Session has expired
    #[error("Session expired")]
    SessionExpired,

    /// Invalid nick or password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated, but the role does not open the admin panel
    #[error("Insufficient permissions to {0}")]
    InsufficientPermissions(String),

    /// A user with this nick already exists
    #[error("User already exists")]
    UserAlreadyExists,

    /// Password could not be hashed or verified
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl AuthError {
    /// Check if this is an authentication error (401)
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            AuthError::AuthenticationRequired
                | AuthError::SessionNotFound
                | AuthError::SessionExpired
                | AuthError::InvalidCredentials
        )
    }

    /// Get HTTP status code for this error
    pub fn http_status_code(&self) -> u16 {
        match self {
            e if e.is_authentication_error() => 401,
            AuthError::InsufficientPermissions(_) => 403,
            AuthError::UserAlreadyExists => 409,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert!(AuthError::SessionExpired.is_authentication_error());
        assert!(!AuthError::InsufficientPermissions("open admin".into()).is_authentication_error());
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(AuthError::InvalidCredentials.http_status_code(), 401);
        assert_eq!(
            AuthError::InsufficientPermissions("open admin".into()).http_status_code(),
            403
        );
        assert_eq!(AuthError::UserAlreadyExists.http_status_code(), 409);
        assert_eq!(AuthError::Hashing("x".into()).http_status_code(), 500);
    }
}
