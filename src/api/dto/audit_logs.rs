//! DTOs for the audit log listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DisplayFromStr, serde_as};

use crate::domain::entities::AuditLog;

/// `?limit=...`
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct AuditLogParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AuditLogItem {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<i64>,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

impl From<AuditLog> for AuditLogItem {
    fn from(a: AuditLog) -> Self {
        AuditLogItem {
            id: a.id,
            user_id: a.user_id,
            action: a.action,
            resource_type: a.resource_type,
            resource_id: a.resource_id,
            details: a.details,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuditLogListResponse {
    pub items: Vec<AuditLogItem>,
}
