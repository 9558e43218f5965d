//! Mapping of domain errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use super::flash::redirect_with;
use crate::errors::{AdminError, AuthError, NetworkError};
use crate::services::FlashMessage;

pub const HOME_PATH: &str = "/";

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub fn json_message(code: StatusCode, message: impl Into<String>) -> Response {
    (code, Json(json!({ "message": message.into() }))).into_response()
}

/// Error body for the JSON mutation routes.
pub fn network_json_error(err: NetworkError) -> Response {
    if err.is_soft() {
        warn!("{}", err);
    } else {
        error!("{}", err);
    }
    json_message(status(err.http_status_code()), err.to_string())
}

/// Soft failures become a flash and a redirect home; the rest are errors.
pub fn network_page_error(err: NetworkError) -> Response {
    if err.is_soft() {
        warn!("{}", err);
        return redirect_with(HOME_PATH, &[FlashMessage::warning(err.to_string())]);
    }
    network_json_error(err)
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        if self.is_fatal() {
            error!("Admin failure: {}", self);
        } else {
            warn!("Admin request rejected: {}", self);
        }
        json_message(status(self.http_status_code()), self.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        json_message(status(self.http_status_code()), self.to_string())
    }
}
