//! PostgreSQL repository implementations.
//!
//! Concrete implementations of the domain repository traits. Queries are
//! checked at runtime with `sqlx::query_as` and mapped through private
//! `FromRow` row structs.
//!
//! # Repositories
//!
//! - [`PgWorkerRepository`] - Workers and their derived counts
//! - [`PgQrCodeRepository`] - QR code storage and token lookup
//! - [`PgScanRepository`] - Scan and scan location telemetry
//! - [`PgAuditLogRepository`] - Append-only audit log
//! - [`PgTokenRepository`] - API token storage and validation

pub mod pg_audit_log_repository;
pub mod pg_qr_code_repository;
pub mod pg_scan_repository;
pub mod pg_token_repository;
pub mod pg_worker_repository;

pub use pg_audit_log_repository::PgAuditLogRepository;
pub use pg_qr_code_repository::PgQrCodeRepository;
pub use pg_scan_repository::PgScanRepository;
pub use pg_token_repository::PgTokenRepository;
pub use pg_worker_repository::PgWorkerRepository;
