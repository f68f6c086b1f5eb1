//! Repository trait for scan telemetry.

use crate::domain::entities::{NewScan, NewScanLocation, Scan, ScanDetails, ScanLocation};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for recording and querying scans.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgScanRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScanRepository: Send + Sync {
    /// Records a scan of a QR code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the QR code does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn record_scan(&self, new_scan: NewScan) -> Result<Scan, AppError>;

    /// Attaches a location to an existing scan.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the scan already has a location.
    /// Returns [`AppError::Internal`] on database errors.
    async fn record_location(&self, location: NewScanLocation) -> Result<ScanLocation, AppError>;

    /// Lists scans newer than `since` (all scans when `None`), newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ScanDetails>, AppError>;

    /// Counts all scans.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self) -> Result<i64, AppError>;
}
