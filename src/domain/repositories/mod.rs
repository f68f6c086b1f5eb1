//! Repository trait definitions for the domain layer.
//!
//! Traits define the data access contract; PostgreSQL implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! with `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`WorkerRepository`] - Worker CRUD and per-worker counters
//! - [`QrCodeRepository`] - QR code CRUD and tracking token lookup
//! - [`ScanRepository`] - Scan and location telemetry
//! - [`AuditLogRepository`] - Administrative audit trail
//! - [`TokenRepository`] - API token authentication

pub mod audit_log_repository;
pub mod qr_code_repository;
pub mod scan_repository;
pub mod token_repository;
pub mod worker_repository;

pub use audit_log_repository::AuditLogRepository;
pub use qr_code_repository::QrCodeRepository;
pub use scan_repository::ScanRepository;
pub use token_repository::{ApiToken, TokenRepository};
pub use worker_repository::{WorkerCounts, WorkerRepository};

#[cfg(test)]
pub use audit_log_repository::MockAuditLogRepository;
#[cfg(test)]
pub use qr_code_repository::MockQrCodeRepository;
#[cfg(test)]
pub use scan_repository::MockScanRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use worker_repository::MockWorkerRepository;
