//! Business logic services for the application layer.

pub mod audit_service;
pub mod auth_service;
pub mod qr_code_service;
pub mod redirect_service;
pub mod scan_recorder;
pub mod stats_service;
pub mod worker_service;

pub use audit_service::AuditService;
pub use auth_service::AuthService;
pub use qr_code_service::QrCodeService;
pub use redirect_service::RedirectService;
pub use scan_recorder::ScanRecorder;
pub use stats_service::StatsService;
pub use worker_service::WorkerService;
