use crate::core::errors::BillSplitError;
use crate::core::models::audit::AppLog;
use crate::infrastructure::logging::{LogFilter, LoggingService};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryLogging {
    entries: Arc<RwLock<Vec<AppLog>>>,
}

impl InMemoryLogging {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoggingService for InMemoryLogging {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
        group_id: Option<&str>,
    ) -> Result<(), BillSplitError> {
        let serde_json::Value::Object(details) = details else {
            return Err(BillSplitError::LoggingError(format!(
                "Details for {} must be a JSON object",
                action
            )));
        };
        let entry = AppLog {
            id: Uuid::new_v4().to_string(),
            action: action.to_string(),
            user_id: user_id.map(String::from),
            group_id: group_id.map(String::from),
            details: details.into_iter().collect(),
            timestamp: Utc::now(),
        };
        debug!("Audit {} by {:?}", entry.action, entry.user_id);
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<AppLog>, BillSplitError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().filter(|e| filter.matches(e)).cloned().collect())
    }
}
