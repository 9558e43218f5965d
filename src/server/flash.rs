//! Flash messages carried across a redirect in the `flash` cookie.

use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use url::form_urlencoded;

use super::extract::cookie;
use crate::services::FlashMessage;

pub const FLASH_COOKIE: &str = "flash";

pub fn encode(messages: &[FlashMessage]) -> String {
    let json = serde_json::to_string(messages).unwrap_or_else(|_| "[]".to_string());
    form_urlencoded::byte_serialize(json.as_bytes()).collect()
}

pub fn decode(raw: &str) -> Vec<FlashMessage> {
    form_urlencoded::parse(raw.as_bytes())
        .next()
        .and_then(|(json, _)| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

/// Messages left by the previous response.
pub fn pending(headers: &HeaderMap) -> Vec<FlashMessage> {
    cookie(headers, FLASH_COOKIE)
        .map(|raw| decode(&raw))
        .unwrap_or_default()
}

/// Redirect to `location`, leaving `messages` for the next page.
pub fn redirect_with(location: &str, messages: &[FlashMessage]) -> Response {
    let mut response = Redirect::to(location).into_response();
    if !messages.is_empty() {
        let cookie = format!("{}={}; Path=/; HttpOnly", FLASH_COOKIE, encode(messages));
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

/// Expire the flash cookie once its messages were shown.
pub fn clear(response: &mut Response) {
    response.headers_mut().append(
        header::SET_COOKIE,
        HeaderValue::from_static("flash=; Path=/; Max-Age=0"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_survive_the_cookie() {
        let messages = vec![
            FlashMessage::warning("Нет такой сети"),
            FlashMessage::error("a=b; c & d"),
        ];
        let raw = encode(&messages);
        assert!(!raw.contains(';'));
        assert!(!raw.contains(' '));
        assert_eq!(decode(&raw), messages);
    }

    #[test]
    fn garbage_decodes_to_nothing() {
        assert!(decode("not-json").is_empty());
        assert!(decode("").is_empty());
    }

    #[test]
    fn redirect_sets_cookie_only_with_messages() {
        let response = redirect_with("/", &[]);
        assert!(response.headers().get(header::SET_COOKIE).is_none());

        let response = redirect_with("/", &[FlashMessage::info("ok")]);
        let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("flash="));
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    }
}
