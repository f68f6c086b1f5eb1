//! PostgreSQL implementation of QR code repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use std::sync::Arc;

use crate::domain::entities::{NewQrCode, QrCode, QrCustomization};
use crate::domain::repositories::QrCodeRepository;
use crate::error::AppError;

const QR_CODE_COLUMNS: &str = "id, worker_id, purpose, username, product_code, target_url, \
     tracking_url, customization, scan_count, created_at";

#[derive(sqlx::FromRow)]
struct QrCodeRow {
    id: i64,
    worker_id: i64,
    purpose: String,
    username: Option<String>,
    product_code: Option<String>,
    target_url: String,
    tracking_url: String,
    customization: Json<QrCustomization>,
    scan_count: i64,
    created_at: DateTime<Utc>,
}

impl From<QrCodeRow> for QrCode {
    fn from(row: QrCodeRow) -> Self {
        QrCode {
            id: row.id,
            worker_id: row.worker_id,
            purpose: row.purpose,
            username: row.username,
            product_code: row.product_code,
            target_url: row.target_url,
            tracking_url: row.tracking_url,
            customization: row.customization.0,
            scan_count: row.scan_count,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL repository for QR codes.
///
/// The rendering customization is stored as JSONB.
pub struct PgQrCodeRepository {
    pool: Arc<PgPool>,
}

impl PgQrCodeRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QrCodeRepository for PgQrCodeRepository {
    async fn create(&self, new_qr_code: NewQrCode) -> Result<QrCode, AppError> {
        let sql = format!(
            r#"
            INSERT INTO qr_codes
                (worker_id, purpose, username, product_code, target_url, tracking_url, customization)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {QR_CODE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, QrCodeRow>(&sql)
            .bind(new_qr_code.worker_id)
            .bind(&new_qr_code.purpose)
            .bind(&new_qr_code.username)
            .bind(&new_qr_code.product_code)
            .bind(&new_qr_code.target_url)
            .bind(&new_qr_code.tracking_url)
            .bind(Json(&new_qr_code.customization))
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<QrCode>, AppError> {
        let sql = format!("SELECT {QR_CODE_COLUMNS} FROM qr_codes WHERE id = $1");

        let row = sqlx::query_as::<_, QrCodeRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_tracking_token(&self, token: &str) -> Result<Option<QrCode>, AppError> {
        let sql = format!("SELECT {QR_CODE_COLUMNS} FROM qr_codes WHERE tracking_url = $1");

        let row = sqlx::query_as::<_, QrCodeRow>(&sql)
            .bind(token)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, worker_id: Option<i64>) -> Result<Vec<QrCode>, AppError> {
        let sql = format!(
            r#"
            SELECT {QR_CODE_COLUMNS}
            FROM qr_codes
            WHERE ($1::BIGINT IS NULL OR worker_id = $1)
            ORDER BY created_at DESC, id DESC
            "#
        );

        let rows = sqlx::query_as::<_, QrCodeRow>(&sql)
            .bind(worker_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM qr_codes WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM qr_codes")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
