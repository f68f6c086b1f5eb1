//! Repository trait for worker data access.

use crate::domain::entities::{NewWorker, Worker};
use crate::error::AppError;
use async_trait::async_trait;

/// Per-worker counters derived from related tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerCounts {
    pub worker_id: i64,
    pub qr_codes: i64,
    pub scans: i64,
}

/// Repository interface for managing workers.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgWorkerRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkerRepository: Send + Sync {
    /// Creates a new worker.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the worker code is already taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_worker: NewWorker) -> Result<Worker, AppError>;

    /// Finds a worker by ID.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<Worker>, AppError>;

    /// Lists all workers ordered by creation time.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self) -> Result<Vec<Worker>, AppError>;

    /// Returns QR code and scan counts for every worker that has any.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn counts(&self) -> Result<Vec<WorkerCounts>, AppError>;

    /// Deletes a worker together with its QR codes.
    ///
    /// Returns `Ok(false)` if no worker had this ID.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Counts all workers.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self) -> Result<i64, AppError>;
}
