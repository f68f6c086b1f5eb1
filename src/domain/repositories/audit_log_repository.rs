//! Repository trait for the audit log.

use crate::domain::entities::{AuditLog, NewAuditLog};
use crate::error::AppError;
use async_trait::async_trait;

/// Append-only store of administrative actions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Appends an entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn record(&self, entry: NewAuditLog) -> Result<AuditLog, AppError>;

    /// Returns the most recent entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_recent(&self, limit: i64) -> Result<Vec<AuditLog>, AppError>;
}
