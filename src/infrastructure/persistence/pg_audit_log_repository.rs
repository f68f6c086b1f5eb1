//! PostgreSQL implementation of audit log repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;
use std::sync::Arc;

use crate::domain::entities::{AuditLog, NewAuditLog};
use crate::domain::repositories::AuditLogRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct AuditLogRow {
    id: i64,
    user_id: Option<i64>,
    action: String,
    resource_type: String,
    resource_id: Option<i64>,
    details: Json<Value>,
    created_at: DateTime<Utc>,
}

impl From<AuditLogRow> for AuditLog {
    fn from(row: AuditLogRow) -> Self {
        AuditLog {
            id: row.id,
            user_id: row.user_id,
            action: row.action,
            resource_type: row.resource_type,
            resource_id: row.resource_id,
            details: row.details.0,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL repository for the audit log.
pub struct PgAuditLogRepository {
    pool: Arc<PgPool>,
}

impl PgAuditLogRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for PgAuditLogRepository {
    async fn record(&self, entry: NewAuditLog) -> Result<AuditLog, AppError> {
        let row = sqlx::query_as::<_, AuditLogRow>(
            r#"
            INSERT INTO audit_logs (user_id, action, resource_type, resource_id, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, action, resource_type, resource_id, details, created_at
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.resource_type)
        .bind(entry.resource_id)
        .bind(Json(&entry.details))
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<AuditLog>, AppError> {
        let rows = sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT id, user_id, action, resource_type, resource_id, details, created_at
            FROM audit_logs
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
