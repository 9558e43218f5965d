//! Bulk grading triggers used by the admin panel.
//!
//! Two entry points with different failure policies: checking by question
//! skips records it cannot resolve and carries on, while a GUID list is
//! resolved completely before anything is submitted.

use std::sync::Arc;

use sea_orm::*;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::check_task::CheckTaskQueue;
use super::messages::FlashMessage;
use crate::admin::picker::Choice;
use crate::database::entities::{networks, questions, session_questions};
use crate::document::NetworkDocument;
use crate::errors::{AdminError, AdminResult};

const CHOICE_LABEL_LIMIT: usize = 50;

/// What a bulk check did, plus the messages to show the operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct CheckReport {
    pub submitted: usize,
    pub messages: Vec<FlashMessage>,
}

impl CheckReport {
    fn failed(message: FlashMessage) -> Self {
        Self {
            submitted: 0,
            messages: vec![message],
        }
    }
}

#[derive(Clone)]
pub struct CheckService {
    db: DatabaseConnection,
    queue: Arc<dyn CheckTaskQueue>,
}

impl CheckService {
    pub fn new(db: DatabaseConnection, queue: Arc<dyn CheckTaskQueue>) -> Self {
        Self { db, queue }
    }

    /// Questions offered by the check-by-question form.
    pub async fn question_choices(&self) -> AdminResult<Vec<Choice>> {
        let rows: Vec<(i32, String)> = questions::Entity::find()
            .select_only()
            .column(questions::Column::Id)
            .column(questions::Column::Text)
            .distinct()
            .order_by_asc(questions::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, text)| Choice::new(id.to_string(), truncate_label(&text)))
            .collect())
    }

    /// Submit every ungraded session answer to `question_id` for grading.
    pub async fn check_by_question(
        &self,
        question_id: i32,
        requirements: &str,
    ) -> AdminResult<CheckReport> {
        if questions::Entity::find_by_id(question_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(AdminError::Validation("Not a valid choice".to_string()));
        }

        let requirements: Value = match serde_json::from_str(requirements) {
            Ok(value) => value,
            Err(_) => {
                return Ok(CheckReport::failed(FlashMessage::error(
                    "Некорректный JSON в requirements.",
                )))
            }
        };

        let entries = session_questions::Entity::find()
            .filter(session_questions::Column::QuestionId.eq(question_id))
            .filter(session_questions::Column::MaxScore.eq(0))
            .filter(session_questions::Column::QuizSessionId.is_not_null())
            .order_by_asc(session_questions::Column::Id)
            .all(&self.db)
            .await?;

        if entries.is_empty() {
            return Ok(CheckReport::failed(FlashMessage::warning(
                "Нет новых записей для этого вопроса.",
            )));
        }

        let mut report = CheckReport::default();
        for entry in &entries {
            let guid = entry.network_guid.as_deref().unwrap_or_default();
            let network = match guid {
                "" => None,
                guid => {
                    networks::Entity::find()
                        .filter(networks::Column::Guid.eq(guid))
                        .one(&self.db)
                        .await?
                }
            };

            let Some(network) = network else {
                warn!("Session question {} refers to missing network {:?}", entry.id, guid);
                report
                    .messages
                    .push(FlashMessage::error(format!("Сеть с GUID {} не найдена.", guid)));
                continue;
            };

            let document = match NetworkDocument::parse(&network.network) {
                Ok(document) => document.into_value(),
                Err(e) => {
                    warn!("Network {} is unreadable: {}", network.guid, e);
                    report.messages.push(FlashMessage::error(format!(
                        "Сеть для записи {} не может быть прочитана.",
                        entry.id
                    )));
                    continue;
                }
            };

            match self.queue.submit(&document, &requirements, entry.id).await {
                Ok(()) => report.submitted += 1,
                Err(e) => {
                    warn!("Check task for session question {} failed: {}", entry.id, e);
                    report.messages.push(FlashMessage::error(format!(
                        "Ошибка при проверке записи {}: {}",
                        entry.id, e
                    )));
                }
            }
        }

        info!(
            "Submitted {} of {} check tasks for question {}",
            report.submitted,
            entries.len(),
            question_id
        );
        report.messages.push(FlashMessage::success(format!(
            "Запросы на проверку отправлены для {} записей.",
            report.submitted
        )));
        Ok(report)
    }

    /// Submit one batch for a newline separated list of network GUIDs.
    /// Nothing is submitted unless every GUID resolves.
    pub async fn create_check_task(
        &self,
        guids: &str,
        requirements: &str,
    ) -> AdminResult<CheckReport> {
        let requirements: Value = match serde_json::from_str(requirements) {
            Ok(value) => value,
            Err(e) => return Ok(CheckReport::failed(batch_error(e))),
        };

        let guids: Vec<&str> = guids
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let mut batch = Vec::with_capacity(guids.len());
        for guid in guids {
            let network = networks::Entity::find()
                .filter(networks::Column::Guid.eq(guid))
                .one(&self.db)
                .await?;

            let Some(network) = network else {
                warn!("Check task aborted, network {} not found", guid);
                return Ok(CheckReport::failed(batch_error(format!(
                    "Сеть с GUID {} не найдена.",
                    guid
                ))));
            };

            match NetworkDocument::parse(&network.network) {
                Ok(document) => batch.push((document.into_value(), guid.to_string())),
                Err(e) => return Ok(CheckReport::failed(batch_error(e))),
            }
        }

        let count = batch.len();
        if let Err(e) = self.queue.submit_batch(batch, &requirements).await {
            warn!("Batch check task failed: {}", e);
            return Ok(CheckReport::failed(batch_error(e)));
        }

        info!("Submitted batch check task for {} networks", count);
        Ok(CheckReport {
            submitted: count,
            messages: vec![FlashMessage::success("Задача проверки успешно создана.")],
        })
    }
}

fn batch_error(e: impl std::fmt::Display) -> FlashMessage {
    FlashMessage::error(format!("Ошибка: {}", e))
}

fn truncate_label(text: &str) -> String {
    if text.chars().count() > CHOICE_LABEL_LIMIT {
        let head: String = text.chars().take(CHOICE_LABEL_LIMIT).collect();
        format!("{}…", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_labels_are_kept() {
        assert_eq!(truncate_label("Какой адрес у шлюза?"), "Какой адрес у шлюза?");
    }

    #[test]
    fn long_labels_are_cut_by_characters() {
        let text = "ж".repeat(60);
        let label = truncate_label(&text);
        assert_eq!(label.chars().count(), 51);
        assert!(label.ends_with('…'));
    }

    #[test]
    fn batch_errors_are_prefixed() {
        let message = batch_error("Сеть с GUID x не найдена.");
        assert_eq!(message.message, "Ошибка: Сеть с GUID x не найдена.");
    }
}
