use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::server::app::AppState;
use crate::server::extract::{session_id, SESSION_COOKIE};
use crate::server::responses::json_message;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    pub nick: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub session_id: String,
}

fn session_cookie(value: &str, max_age: i64) -> Option<HeaderValue> {
    let cookie = format!("{}={}; Path=/; HttpOnly; Max-Age={}", SESSION_COOKIE, value, max_age);
    HeaderValue::from_str(&cookie).ok()
}

/// Where unauthenticated callers are sent.
#[utoipa::path(
    get,
    path = "/auth/login",
    responses((status = 401, description = "Login is required"))
)]
pub async fn login_page() -> Response {
    json_message(
        StatusCode::UNAUTHORIZED,
        "Authentication required: POST nick and password to /auth/login",
    )
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Session opened; also set as the session_id cookie", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state.auth.login(&form.nick, &form.password).await {
        Ok(session) => {
            info!("User {} logged in", session.user_id);
            let max_age = (session.expires_at - session.created_at).num_seconds();
            let mut response = Json(LoginResponse {
                session_id: session.session_id.clone(),
            })
            .into_response();
            if let Some(cookie) = session_cookie(&session.session_id, max_age) {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            response
        }
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Session closed"))
)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id(&headers) {
        match state.auth.logout(&id).await {
            Ok(()) => {}
            Err(e) if e.is_authentication_error() => {}
            Err(e) => return e.into_response(),
        }
    }

    let mut response = StatusCode::NO_CONTENT.into_response();
    if let Some(cookie) = session_cookie("", 0) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}
