//! Request identity.
//!
//! The session id comes from the `x-session-id` header or the `session_id`
//! cookie. Routes that need a user take [`CurrentUser`] or [`AdminUser`];
//! both send unauthenticated callers to the login entry point.
//! Network mutations read their payload through [`JsonBody`].

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, error};

use super::app::AppState;
use crate::admin::is_admin;
use crate::database::entities::users;
use crate::errors::NetworkError;

pub const SESSION_HEADER: &str = "x-session-id";
pub const SESSION_COOKIE: &str = "session_id";
pub const LOGIN_PATH: &str = "/auth/login";

/// Value of cookie `name`, if the request carries it.
pub fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| cookie(headers, SESSION_COOKIE))
        .filter(|id| !id.is_empty())
}

fn to_login() -> Response {
    Redirect::to(LOGIN_PATH).into_response()
}

/// An authenticated user.
pub struct CurrentUser(pub users::Model);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(session_id) = session_id(&parts.headers) else {
            return Err(to_login());
        };

        match state.auth.user_for_session(&session_id).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(e) if e.is_authentication_error() => {
                debug!("Rejected session: {}", e);
                Err(to_login())
            }
            Err(e) => {
                error!("Session lookup failed: {}", e);
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": e.to_string() })),
                )
                    .into_response())
            }
        }
    }
}

/// An authenticated user whose role opens the admin panel.
pub struct AdminUser(pub users::Model);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !is_admin(&user) {
            debug!("User {} with role {} refused admin access", user.id, user.role);
            return Err(to_login());
        }
        Ok(AdminUser(user))
    }
}

/// A JSON request body. A body that is not JSON does not reject the request;
/// it is kept as [`NetworkError::InvalidBody`] so the handler can check the
/// GUID first and answer with its usual 400.
pub struct JsonBody(pub Result<Value, NetworkError>);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Json::<Value>::from_request(req, state)
            .await
            .map(|Json(value)| value)
            .map_err(|rejection| NetworkError::InvalidBody(rejection.body_text()));
        Ok(JsonBody(body))
    }
}
