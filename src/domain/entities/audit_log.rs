//! Audit log entry for administrative actions.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A recorded administrative action.
#[derive(Debug, Clone)]
pub struct AuditLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<i64>,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

/// Input data for writing an audit entry.
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub user_id: Option<i64>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<i64>,
    pub details: Value,
}

impl NewAuditLog {
    /// Entry for an action on a QR code, attributed to its owning worker.
    pub fn qr_code(action: &str, worker_id: i64, qr_code_id: i64, details: Value) -> Self {
        Self {
            user_id: Some(worker_id),
            action: action.to_string(),
            resource_type: "qr_code".to_string(),
            resource_id: Some(qr_code_id),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_qr_code_entry() {
        let entry = NewAuditLog::qr_code("create", 4, 42, json!({ "purpose": "Flyer" }));

        assert_eq!(entry.user_id, Some(4));
        assert_eq!(entry.action, "create");
        assert_eq!(entry.resource_type, "qr_code");
        assert_eq!(entry.resource_id, Some(42));
        assert_eq!(entry.details["purpose"], "Flyer");
    }
}
