//! Repository trait for QR code data access.

use crate::domain::entities::{NewQrCode, QrCode};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing QR codes.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgQrCodeRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QrCodeRepository: Send + Sync {
    /// Creates a new QR code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the tracking token is already in use.
    /// Returns [`AppError::Validation`] if the worker does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_qr_code: NewQrCode) -> Result<QrCode, AppError>;

    /// Finds a QR code by ID.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<QrCode>, AppError>;

    /// Finds a QR code by the tracking token embedded in its redirect URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_tracking_token(&self, token: &str) -> Result<Option<QrCode>, AppError>;

    /// Lists QR codes, optionally only those of one worker.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, worker_id: Option<i64>) -> Result<Vec<QrCode>, AppError>;

    /// Deletes a QR code together with its scans.
    ///
    /// Returns `Ok(false)` if no QR code had this ID.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Counts all QR codes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self) -> Result<i64, AppError>;
}
