use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use sea_orm::*;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::entities::{user_sessions, users};
use crate::errors::{AuthError, AuthResult};

pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Accounts, passwords and login sessions.
#[derive(Clone)]
pub struct AuthService {
    db: DatabaseConnection,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    pub fn with_session_ttl_hours(mut self, hours: i64) -> Self {
        self.session_ttl = Duration::hours(hours);
        self
    }

    pub fn hash_password(password: &str) -> AuthResult<String> {
        if password.is_empty() {
            return Err(AuthError::Hashing("Password cannot be empty".to_string()));
        }
        hash(password, DEFAULT_COST).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    pub fn verify_password(password: &str, hash: &str) -> AuthResult<bool> {
        verify(password, hash).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    pub fn generate_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub async fn create_user(&self, nick: &str, password: &str, role: i32) -> AuthResult<users::Model> {
        let nick = nick.trim();
        let existing = users::Entity::find()
            .filter(users::Column::Nick.eq(nick))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let user = users::ActiveModel {
            nick: Set(nick.to_string()),
            email: Set(None),
            password_hash: Set(Self::hash_password(password)?),
            role: Set(role),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let user = user.insert(&self.db).await?;
        info!("Created user {} with role {}", user.nick, user.role);
        Ok(user)
    }

    /// Check credentials and open a session.
    pub async fn login(&self, nick: &str, password: &str) -> AuthResult<user_sessions::Model> {
        let user = users::Entity::find()
            .filter(users::Column::Nick.eq(nick.trim()))
            .one(&self.db)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !Self::verify_password(password, &user.password_hash)? {
            warn!("Failed login for {}", user.nick);
            return Err(AuthError::InvalidCredentials);
        }

        self.open_session(&user).await
    }

    pub async fn open_session(&self, user: &users::Model) -> AuthResult<user_sessions::Model> {
        let now = Utc::now();
        let session = user_sessions::ActiveModel {
            session_id: Set(Self::generate_session_id()),
            user_id: Set(user.id),
            created_at: Set(now),
            expires_at: Set(now + self.session_ttl),
            is_active: Set(true),
            ..Default::default()
        };
        Ok(session.insert(&self.db).await?)
    }

    /// The user behind an active, unexpired session.
    pub async fn user_for_session(&self, session_id: &str) -> AuthResult<users::Model> {
        let session = user_sessions::Entity::find()
            .filter(user_sessions::Column::SessionId.eq(session_id))
            .filter(user_sessions::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if session.expires_at <= Utc::now() {
            return Err(AuthError::SessionExpired);
        }

        users::Entity::find_by_id(session.user_id)
            .one(&self.db)
            .await?
            .ok_or(AuthError::SessionNotFound)
    }

    pub async fn logout(&self, session_id: &str) -> AuthResult<()> {
        let session = user_sessions::Entity::find()
            .filter(user_sessions::Column::SessionId.eq(session_id))
            .one(&self.db)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        let mut active: user_sessions::ActiveModel = session.into();
        active.is_active = Set(false);
        active.update(&self.db).await?;
        Ok(())
    }
}
