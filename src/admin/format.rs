//! Display formatting for admin columns.

use chrono::{DateTime, NaiveDateTime, Utc};
use sea_orm::*;
use serde_json::Value;
use tracing::error;

use crate::database::entities::{questions, quiz_tests, sections, users};
use crate::errors::{AdminError, AdminResult};

pub const SECTION_DATETIME_FORMAT: &str = "%d-%m-%Y %H:%M";

pub fn datetime(value: &DateTime<Utc>) -> Value {
    Value::String(value.format("%Y-%m-%d %H:%M:%S").to_string())
}

pub fn naive_datetime(value: &NaiveDateTime) -> Value {
    Value::String(value.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Nulls render as empty strings.
pub fn nullable<T: Into<Value>>(value: Option<T>) -> Value {
    value.map(Into::into).unwrap_or_else(|| Value::String(String::new()))
}

/// Parse `results_available_from` as typed in the section form.
pub fn parse_section_datetime(raw: Option<&str>) -> AdminResult<Option<NaiveDateTime>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDateTime::parse_from_str(raw, SECTION_DATETIME_FORMAT)
            .map(Some)
            .map_err(|_| {
                AdminError::Validation(format!(
                    "results_available_from: expected d-m-Y H:M, got {}",
                    raw
                ))
            }),
    }
}

fn integrity(message: String) -> AdminError {
    error!("{}", message);
    AdminError::Integrity(message)
}

/// The author's nick. A missing user or an empty nick is corrupt data.
pub async fn creator_nick<C: ConnectionTrait>(
    db: &C,
    created_by_id: Option<i32>,
) -> AdminResult<String> {
    let user = match created_by_id {
        Some(id) => users::Entity::find_by_id(id).one(db).await?,
        None => None,
    };
    match user {
        Some(user) if !user.nick.is_empty() => Ok(user.nick),
        _ => Err(integrity(format!(
            "Error occurred while retrieving user nickname (created_by_id={:?})",
            created_by_id
        ))),
    }
}

pub async fn test_name<C: ConnectionTrait>(db: &C, test_id: i32) -> AdminResult<String> {
    match quiz_tests::Entity::find_by_id(test_id).one(db).await? {
        Some(test) if !test.name.is_empty() => Ok(test.name),
        _ => Err(integrity(format!(
            "Error occurred while retrieving test name (test_id={})",
            test_id
        ))),
    }
}

pub async fn section_name<C: ConnectionTrait>(
    db: &C,
    section_id: Option<i32>,
) -> AdminResult<String> {
    let Some(section_id) = section_id else {
        return Ok(super::picker::NO_SECTION_LABEL.to_string());
    };
    match sections::Entity::find_by_id(section_id).one(db).await? {
        Some(section) if !section.name.is_empty() => Ok(section.name),
        _ => Err(integrity(format!(
            "Error occurred while retrieving section name (section_id={})",
            section_id
        ))),
    }
}

/// Question text for an answer row. Missing questions are not an error here.
pub async fn answer_question_text<C: ConnectionTrait>(
    db: &C,
    question_id: Option<i32>,
) -> AdminResult<String> {
    let Some(question_id) = question_id else {
        return Ok("Вопрос не установлен".to_string());
    };
    Ok(questions::Entity::find_by_id(question_id)
        .one(db)
        .await?
        .map(|q| q.text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| "Вопрос не найден".to_string()))
}

pub async fn session_question_text<C: ConnectionTrait>(
    db: &C,
    question_id: i32,
) -> AdminResult<String> {
    Ok(questions::Entity::find_by_id(question_id)
        .one(db)
        .await?
        .map(|q| q.text)
        .unwrap_or_else(|| "<вопрос не найден>".to_string()))
}
