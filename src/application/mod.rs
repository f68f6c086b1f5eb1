//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::worker_service::WorkerService`] - Worker management
//! - [`services::qr_code_service::QrCodeService`] - QR code management with audit trail
//! - [`services::redirect_service::RedirectService`] - Tracking token resolution
//! - [`services::scan_recorder::ScanRecorder`] - Scan and location telemetry
//! - [`services::stats_service::StatsService`] - Chart-ready statistics
//! - [`services::audit_service::AuditService`] - Audit log listing
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
