//! Audit trail entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLog {
    pub id: i64,
    pub user_id: Option<Uuid>,
    pub record_id: String,
    pub action: String,
    pub model: String,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Entry to be written alongside a change.
#[derive(Debug, Clone)]
pub struct CreateAuditLog {
    pub user_id: Option<Uuid>,
    pub record_id: String,
    pub action: &'static str,
    pub model: &'static str,
    pub details: Option<serde_json::Value>,
}

impl CreateAuditLog {
    pub fn new(
        user_id: Uuid,
        record_id: impl ToString,
        action: &'static str,
        model: &'static str,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            record_id: record_id.to_string(),
            action,
            model,
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
