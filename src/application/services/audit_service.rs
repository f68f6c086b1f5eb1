//! Read access to the audit log.

use std::sync::Arc;

use crate::domain::entities::AuditLog;
use crate::domain::repositories::AuditLogRepository;
use crate::error::AppError;

pub const DEFAULT_AUDIT_LIMIT: i64 = 50;
pub const MAX_AUDIT_LIMIT: i64 = 500;

pub struct AuditService<R: AuditLogRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: AuditLogRepository + ?Sized> AuditService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Most recent entries, newest first. `limit` is clamped to `1..=500`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn recent(&self, limit: Option<i64>) -> Result<Vec<AuditLog>, AppError> {
        let limit = limit
            .unwrap_or(DEFAULT_AUDIT_LIMIT)
            .clamp(1, MAX_AUDIT_LIMIT);
        self.repository.list_recent(limit).await
    }
}
