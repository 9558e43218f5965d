//! Client side of the external grading service.
//!
//! Submissions are fire-and-forget: the service enqueues the work and later
//! writes `score`, `max_score` and `is_correct` back into `session_questions`.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::{CheckTaskError, CheckTaskResult};

#[async_trait]
pub trait CheckTaskQueue: Send + Sync {
    /// Grade one session answer against `requirements`.
    async fn submit(&self, network: &Value, requirements: &Value, record_id: i32)
        -> CheckTaskResult<()>;

    /// Grade a list of `(network, guid)` pairs against shared requirements.
    async fn submit_batch(
        &self,
        networks: Vec<(Value, String)>,
        requirements: &Value,
    ) -> CheckTaskResult<()>;
}

/// Posts tasks as JSON to a check service over HTTP.
#[derive(Clone)]
pub struct HttpCheckTaskQueue {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCheckTaskQueue {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    async fn post(&self, path: &str, body: Value) -> CheckTaskResult<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Submitting check task to {}", url);

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CheckTaskError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CheckTaskQueue for HttpCheckTaskQueue {
    async fn submit(
        &self,
        network: &Value,
        requirements: &Value,
        record_id: i32,
    ) -> CheckTaskResult<()> {
        self.post(
            "/check-task",
            json!({
                "network": network,
                "requirements": requirements,
                "session_question_id": record_id,
            }),
        )
        .await
    }

    async fn submit_batch(
        &self,
        networks: Vec<(Value, String)>,
        requirements: &Value,
    ) -> CheckTaskResult<()> {
        let networks: Vec<Value> = networks
            .into_iter()
            .map(|(network, guid)| json!({ "network": network, "guid": guid }))
            .collect();

        self.post(
            "/check-task/batch",
            json!({ "networks": networks, "requirements": requirements }),
        )
        .await
    }
}

/// A task handed to [`InMemoryCheckTaskQueue`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckSubmission {
    Single {
        network: Value,
        requirements: Value,
        record_id: i32,
    },
    Batch {
        networks: Vec<(Value, String)>,
        requirements: Value,
    },
}

/// Keeps submissions in memory. Used when no check service is configured.
#[derive(Default)]
pub struct InMemoryCheckTaskQueue {
    submissions: Mutex<Vec<CheckSubmission>>,
    unavailable: bool,
}

impl InMemoryCheckTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue that refuses every submission.
    pub fn unavailable() -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            unavailable: true,
        }
    }

    pub async fn submissions(&self) -> Vec<CheckSubmission> {
        self.submissions.lock().await.clone()
    }

    async fn record(&self, submission: CheckSubmission) -> CheckTaskResult<()> {
        if self.unavailable {
            return Err(CheckTaskError::Unavailable(
                "in-memory queue is closed".to_string(),
            ));
        }
        self.submissions.lock().await.push(submission);
        Ok(())
    }
}

#[async_trait]
impl CheckTaskQueue for InMemoryCheckTaskQueue {
    async fn submit(
        &self,
        network: &Value,
        requirements: &Value,
        record_id: i32,
    ) -> CheckTaskResult<()> {
        info!("Queued check task for session question {}", record_id);
        self.record(CheckSubmission::Single {
            network: network.clone(),
            requirements: requirements.clone(),
            record_id,
        })
        .await
    }

    async fn submit_batch(
        &self,
        networks: Vec<(Value, String)>,
        requirements: &Value,
    ) -> CheckTaskResult<()> {
        info!("Queued batch check task for {} networks", networks.len());
        self.record(CheckSubmission::Batch {
            networks,
            requirements: requirements.clone(),
        })
        .await
    }
}
