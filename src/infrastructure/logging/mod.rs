pub mod in_memory;

use crate::core::errors::BillSplitError;
use crate::core::models::audit::AppLog;
use async_trait::async_trait;

/// Narrows an audit trail query. Unset fields match everything.
#[derive(Clone, Debug, Default)]
pub struct LogFilter {
    pub user_id: Option<String>,
    pub group_id: Option<String>,
}

impl LogFilter {
    pub fn matches(&self, log: &AppLog) -> bool {
        let user_ok = self.user_id.as_deref().is_none_or(|id| log.user_id.as_deref() == Some(id));
        let group_ok = self.group_id.as_deref().is_none_or(|id| log.group_id.as_deref() == Some(id));
        user_ok && group_ok
    }
}

/// Append-only audit trail of service actions.
#[async_trait]
pub trait LoggingService: Send + Sync {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
        group_id: Option<&str>,
    ) -> Result<(), BillSplitError>;

    /// Matching entries, oldest first.
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<AppLog>, BillSplitError>;
}
