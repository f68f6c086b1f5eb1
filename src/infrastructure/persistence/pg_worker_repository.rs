//! PostgreSQL implementation of worker repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewWorker, Worker};
use crate::domain::repositories::{WorkerCounts, WorkerRepository};
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct WorkerRow {
    id: i64,
    name: String,
    code: String,
    visits_count: i64,
    created_at: DateTime<Utc>,
}

impl From<WorkerRow> for Worker {
    fn from(row: WorkerRow) -> Self {
        Worker::new(
            row.id,
            row.name,
            row.code,
            row.visits_count,
            row.created_at,
        )
    }
}

#[derive(sqlx::FromRow)]
struct CountsRow {
    worker_id: i64,
    qr_codes: i64,
    scans: i64,
}

/// PostgreSQL repository for workers.
pub struct PgWorkerRepository {
    pool: Arc<PgPool>,
}

impl PgWorkerRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkerRepository for PgWorkerRepository {
    async fn create(&self, new_worker: NewWorker) -> Result<Worker, AppError> {
        let row = sqlx::query_as::<_, WorkerRow>(
            r#"
            INSERT INTO workers (name, code)
            VALUES ($1, $2)
            RETURNING id, name, code, visits_count, created_at
            "#,
        )
        .bind(&new_worker.name)
        .bind(&new_worker.code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Worker>, AppError> {
        let row = sqlx::query_as::<_, WorkerRow>(
            r#"
            SELECT id, name, code, visits_count, created_at
            FROM workers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Worker>, AppError> {
        let rows = sqlx::query_as::<_, WorkerRow>(
            r#"
            SELECT id, name, code, visits_count, created_at
            FROM workers
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn counts(&self) -> Result<Vec<WorkerCounts>, AppError> {
        let rows = sqlx::query_as::<_, CountsRow>(
            r#"
            SELECT q.worker_id,
                   COUNT(DISTINCT q.id) AS qr_codes,
                   COUNT(s.id) AS scans
            FROM qr_codes q
            LEFT JOIN qr_scans s ON s.qr_code_id = q.id
            GROUP BY q.worker_id
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| WorkerCounts {
                worker_id: r.worker_id,
                qr_codes: r.qr_codes,
                scans: r.scans,
            })
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM workers WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workers")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
