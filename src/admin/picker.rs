//! Reference pickers for admin forms.
//!
//! A picker lists the rows a form field may point at and turns a submitted
//! value back into a bare id. Values the picker does not offer are rejected.

use std::collections::HashMap;

use sea_orm::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::database::entities::{question_categories, questions, quiz_tests, sections, users};
use crate::errors::{AdminError, AdminResult};
use crate::markup::unescape;

pub const NO_SECTION_LABEL: &str = "Без раздела";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Picker {
    /// Tests created by the caller
    OwnTests,
    /// Sections created by the caller; blank means no section
    OwnSections,
    Categories,
    /// Every question, labelled with its author
    Questions,
}

impl Picker {
    pub fn allows_blank(self) -> bool {
        matches!(self, Picker::OwnSections)
    }

    pub async fn choices(
        self,
        db: &DatabaseConnection,
        user: &users::Model,
    ) -> AdminResult<Vec<Choice>> {
        let choices = match self {
            Picker::OwnTests => quiz_tests::Entity::find()
                .filter(quiz_tests::Column::CreatedById.eq(user.id))
                .order_by_asc(quiz_tests::Column::Id)
                .all(db)
                .await?
                .into_iter()
                .map(|test| {
                    let mut label = test.name;
                    if let Some(description) = test.description.filter(|d| !d.is_empty()) {
                        label.push_str(", ");
                        label.push_str(&description);
                    }
                    Choice::new(test.id.to_string(), format!("{} ({})", label, user.nick))
                })
                .collect(),
            Picker::OwnSections => {
                let mut choices = vec![Choice::new("", NO_SECTION_LABEL)];
                choices.extend(
                    sections::Entity::find()
                        .filter(sections::Column::CreatedById.eq(user.id))
                        .order_by_asc(sections::Column::Id)
                        .all(db)
                        .await?
                        .into_iter()
                        .map(|section| {
                            Choice::new(
                                section.id.to_string(),
                                format!("{} ({})", section.name, user.nick),
                            )
                        }),
                );
                choices
            }
            Picker::Categories => question_categories::Entity::find()
                .order_by_asc(question_categories::Column::Id)
                .all(db)
                .await?
                .into_iter()
                .map(|category| Choice::new(category.id.to_string(), category.name))
                .collect(),
            Picker::Questions => {
                let nicks: HashMap<i32, String> = users::Entity::find()
                    .all(db)
                    .await?
                    .into_iter()
                    .map(|u| (u.id, u.nick))
                    .collect();

                questions::Entity::find()
                    .order_by_asc(questions::Column::Id)
                    .all(db)
                    .await?
                    .into_iter()
                    .map(|question| {
                        let text = unescape(&question.text);
                        let label = match question.created_by_id.and_then(|id| nicks.get(&id)) {
                            Some(nick) => format!("{} ({})", text, nick),
                            None => text,
                        };
                        Choice::new(question.id.to_string(), label)
                    })
                    .collect()
            }
        };
        Ok(choices)
    }

    /// Turn a submitted value into the id to store.
    pub async fn resolve(
        self,
        db: &DatabaseConnection,
        user: &users::Model,
        field: &str,
        raw: &Value,
    ) -> AdminResult<Option<i32>> {
        let id = match submitted_id(raw) {
            Submitted::Blank if self.allows_blank() => return Ok(None),
            Submitted::Blank => {
                return Err(AdminError::Validation(format!(
                    "{}: This field is required.",
                    field
                )))
            }
            Submitted::Invalid => return Err(not_a_choice(field)),
            Submitted::Id(id) => id,
        };

        let value = id.to_string();
        let offered = self
            .choices(db, user)
            .await?
            .iter()
            .any(|choice| choice.value == value);
        if !offered {
            return Err(not_a_choice(field));
        }
        Ok(Some(id))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Submitted {
    Blank,
    Invalid,
    Id(i32),
}

fn submitted_id(raw: &Value) -> Submitted {
    match raw {
        Value::Null => Submitted::Blank,
        Value::Number(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map_or(Submitted::Invalid, Submitted::Id),
        Value::String(s) if s.trim().is_empty() => Submitted::Blank,
        Value::String(s) => parse_picker_id(s).map_or(Submitted::Invalid, Submitted::Id),
        _ => Submitted::Invalid,
    }
}

/// Accepts a bare id or the `<Question N>` token older forms submit.
pub fn parse_picker_id(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix("<Question ")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(raw);
    raw.trim().parse().ok()
}

fn not_a_choice(field: &str) -> AdminError {
    AdminError::Validation(format!("{}: Not a valid choice", field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_ids_and_tokens_parse_to_the_same_id() {
        assert_eq!(parse_picker_id("12"), Some(12));
        assert_eq!(parse_picker_id(" 12 "), Some(12));
        assert_eq!(parse_picker_id("<Question 12>"), Some(12));
    }

    #[test]
    fn labels_are_not_ids() {
        assert_eq!(parse_picker_id("Какой адрес у шлюза? (tutor)"), None);
        assert_eq!(parse_picker_id("<Question >"), None);
        assert_eq!(parse_picker_id("<Section 3>"), None);
    }

    #[test]
    fn submitted_values() {
        assert_eq!(submitted_id(&json!(null)), Submitted::Blank);
        assert_eq!(submitted_id(&json!("  ")), Submitted::Blank);
        assert_eq!(submitted_id(&json!(4)), Submitted::Id(4));
        assert_eq!(submitted_id(&json!("<Question 4>")), Submitted::Id(4));
        assert_eq!(submitted_id(&json!(4.5)), Submitted::Invalid);
        assert_eq!(submitted_id(&json!([4])), Submitted::Invalid);
    }

    #[test]
    fn only_sections_allow_blank() {
        assert!(Picker::OwnSections.allows_blank());
        assert!(!Picker::OwnTests.allows_blank());
        assert!(!Picker::Questions.allows_blank());
        assert!(!Picker::Categories.allows_blank());
    }
}
