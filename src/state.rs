//! Shared application state injected into every handler.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::{
    AuditService, AuthService, QrCodeService, RedirectService, StatsService, WorkerService,
};
use crate::domain::repositories::{
    AuditLogRepository, QrCodeRepository, ScanRepository, TokenRepository, WorkerRepository,
};
use crate::domain::device_reports::DeviceReports;
use crate::domain::scan_event::ScanEvent;
use crate::infrastructure::cache::CacheService;

pub type DynWorkerService = WorkerService<dyn WorkerRepository>;
pub type DynQrCodeService = QrCodeService<dyn QrCodeRepository, dyn AuditLogRepository>;
pub type DynRedirectService = RedirectService<dyn QrCodeRepository>;
pub type DynStatsService = StatsService<dyn WorkerRepository, dyn QrCodeRepository, dyn ScanRepository>;
pub type DynAuditService = AuditService<dyn AuditLogRepository>;
pub type DynAuthService = AuthService<dyn TokenRepository>;

/// Services and handles shared across requests.
///
/// Repositories are held as trait objects so the same router runs against
/// PostgreSQL in production and in-memory fakes in tests.
#[derive(Clone)]
pub struct AppState {
    pub worker_service: Arc<DynWorkerService>,
    pub qr_code_service: Arc<DynQrCodeService>,
    pub redirect_service: Arc<DynRedirectService>,
    pub stats_service: Arc<DynStatsService>,
    pub audit_service: Arc<DynAuditService>,
    pub auth_service: Arc<DynAuthService>,
    pub cache: Arc<dyn CacheService>,
    pub scan_sender: mpsc::Sender<ScanEvent>,
    /// Browser position reports awaited by the scan worker.
    pub device_reports: Arc<DeviceReports>,
    /// How long the redirect page lets the browser look for a position.
    pub device_location_timeout_ms: u64,
    /// Trust `X-Forwarded-For` / `X-Real-IP` when resolving visitor addresses.
    pub behind_proxy: bool,
}
