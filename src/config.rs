use std::sync::Arc;

use clap::Args;
use tracing::info;

use crate::services::{
    CheckTaskQueue, HttpCheckTaskQueue, InMemoryCheckTaskQueue, DEFAULT_SESSION_TTL_HOURS,
};

/// Settings for `miminet serve`. Every flag can also come from the
/// environment.
#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    #[clap(short, long, env = "MIMINET_PORT", default_value = "5000")]
    pub port: u16,

    #[clap(short, long, env = "MIMINET_DATABASE", default_value = "miminet.db")]
    pub database: String,

    #[clap(long, env = "MIMINET_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Base URL of the grading service; tasks are kept in memory when unset
    #[clap(long, env = "MIMINET_CHECK_SERVICE_URL")]
    pub check_service_url: Option<String>,

    #[clap(long, env = "MIMINET_SESSION_TTL_HOURS", default_value_t = DEFAULT_SESSION_TTL_HOURS)]
    pub session_ttl_hours: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            database: "miminet.db".to_string(),
            cors_origin: None,
            check_service_url: None,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

impl ServerConfig {
    pub fn check_task_queue(&self) -> Arc<dyn CheckTaskQueue> {
        match self.check_service_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => {
                info!("Check tasks go to {}", url);
                Arc::new(HttpCheckTaskQueue::new(url))
            }
            None => {
                info!("No check service configured, check tasks are kept in memory");
                Arc::new(InMemoryCheckTaskQueue::new())
            }
        }
    }
}
