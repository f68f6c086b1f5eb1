//! PostgreSQL implementation of scan repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{
    NewScan, NewScanLocation, Scan, ScanDetails, ScanLocation, UtmParams,
};
use crate::domain::repositories::ScanRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ScanRow {
    id: i64,
    qr_code_id: i64,
    scanned_at: DateTime<Utc>,
    user_agent: Option<String>,
    referrer: Option<String>,
    utm_source: Option<String>,
    utm_medium: Option<String>,
    utm_campaign: Option<String>,
}

#[derive(sqlx::FromRow)]
struct LocationRow {
    scan_id: i64,
    latitude: f64,
    longitude: f64,
    accuracy: Option<f64>,
    city: Option<String>,
    country: Option<String>,
}

impl From<LocationRow> for ScanLocation {
    fn from(row: LocationRow) -> Self {
        ScanLocation {
            scan_id: row.scan_id,
            latitude: row.latitude,
            longitude: row.longitude,
            accuracy: row.accuracy,
            city: row.city,
            country: row.country,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ScanDetailsRow {
    id: i64,
    qr_code_id: i64,
    scanned_at: DateTime<Utc>,
    user_agent: Option<String>,
    referrer: Option<String>,
    purpose: Option<String>,
    worker_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    accuracy: Option<f64>,
    city: Option<String>,
    country: Option<String>,
}

impl From<ScanDetailsRow> for ScanDetails {
    fn from(row: ScanDetailsRow) -> Self {
        let location = match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(ScanLocation {
                scan_id: row.id,
                latitude,
                longitude,
                accuracy: row.accuracy,
                city: row.city,
                country: row.country,
            }),
            _ => None,
        };

        ScanDetails {
            id: row.id,
            qr_code_id: row.qr_code_id,
            scanned_at: row.scanned_at,
            user_agent: row.user_agent,
            referrer: row.referrer,
            purpose: row.purpose,
            worker_name: row.worker_name,
            location,
        }
    }
}

/// PostgreSQL repository for scans and their locations.
///
/// Scan counters on `qr_codes` and `workers` are maintained by a trigger on
/// `qr_scans`, so inserting here is the only write needed.
pub struct PgScanRepository {
    pool: Arc<PgPool>,
}

impl PgScanRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScanRepository for PgScanRepository {
    async fn record_scan(&self, new_scan: NewScan) -> Result<Scan, AppError> {
        let row = sqlx::query_as::<_, ScanRow>(
            r#"
            INSERT INTO qr_scans
                (qr_code_id, user_agent, referrer, utm_source, utm_medium, utm_campaign)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, qr_code_id, scanned_at, user_agent, referrer,
                      utm_source, utm_medium, utm_campaign
            "#,
        )
        .bind(new_scan.qr_code_id)
        .bind(&new_scan.user_agent)
        .bind(&new_scan.referrer)
        .bind(&new_scan.utm.source)
        .bind(&new_scan.utm.medium)
        .bind(&new_scan.utm.campaign)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(Scan {
            id: row.id,
            qr_code_id: row.qr_code_id,
            scanned_at: row.scanned_at,
            user_agent: row.user_agent,
            referrer: row.referrer,
            utm: UtmParams {
                source: row.utm_source,
                medium: row.utm_medium,
                campaign: row.utm_campaign,
            },
        })
    }

    async fn record_location(&self, location: NewScanLocation) -> Result<ScanLocation, AppError> {
        let row = sqlx::query_as::<_, LocationRow>(
            r#"
            INSERT INTO scan_locations (scan_id, latitude, longitude, accuracy, city, country)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING scan_id, latitude, longitude, accuracy, city, country
            "#,
        )
        .bind(location.scan_id)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(location.accuracy)
        .bind(&location.city)
        .bind(&location.country)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn list_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ScanDetails>, AppError> {
        let rows = sqlx::query_as::<_, ScanDetailsRow>(
            r#"
            SELECT s.id, s.qr_code_id, s.scanned_at, s.user_agent, s.referrer,
                   q.purpose, w.name AS worker_name,
                   l.latitude, l.longitude, l.accuracy, l.city, l.country
            FROM qr_scans s
            LEFT JOIN qr_codes q ON q.id = s.qr_code_id
            LEFT JOIN workers w ON w.id = q.worker_id
            LEFT JOIN scan_locations l ON l.scan_id = s.id
            WHERE ($1::TIMESTAMPTZ IS NULL OR s.scanned_at >= $1)
            ORDER BY s.scanned_at DESC, s.id DESC
            "#,
        )
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM qr_scans")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
