#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use axum::{Router, middleware};
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tower::Layer;

use qr_tracker::api::middleware::auth;
use qr_tracker::api::routes::protected_routes;
use qr_tracker::application::services::auth_service::hash_token;
use qr_tracker::application::services::{
    AuditService, AuthService, QrCodeService, RedirectService, StatsService, WorkerService,
};
use qr_tracker::domain::entities::{
    AuditLog, NewAuditLog, NewQrCode, NewScan, NewScanLocation, NewWorker, QrCode,
    QrCustomization, Scan, ScanDetails, ScanLocation, Worker,
};
use qr_tracker::domain::repositories::{
    ApiToken, AuditLogRepository, QrCodeRepository, ScanRepository, TokenRepository, WorkerCounts,
    WorkerRepository,
};
use qr_tracker::domain::device_reports::DeviceReports;
use qr_tracker::domain::geo::{GeoError, IpLocation, IpLocator, Place, ReverseGeocoder};
use qr_tracker::domain::scan_event::ScanEvent;
use qr_tracker::error::AppError;
use qr_tracker::infrastructure::cache::NullCache;
use qr_tracker::state::AppState;
use serde_json::json;

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const API_TOKEN: &str = "test-api-token";
pub const PUBLIC_BASE_URL: &str = "https://qr.example.com";

/// In-memory tables shared by the fake repositories.
#[derive(Default)]
pub struct Store {
    pub workers: Vec<Worker>,
    pub qr_codes: Vec<QrCode>,
    pub scans: Vec<Scan>,
    pub locations: Vec<ScanLocation>,
    pub audit_logs: Vec<AuditLog>,
    pub tokens: Vec<ApiToken>,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct MemoryRepository {
    pub store: Arc<Mutex<Store>>,
}

impl MemoryRepository {
    pub fn insert_worker(&self, name: &str, code: &str) -> Worker {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let worker = Worker::new(id, name.to_string(), code.to_string(), 0, Utc::now());
        store.workers.push(worker.clone());
        worker
    }

    pub fn insert_qr_code(&self, worker_id: i64, token: &str, target_url: &str) -> QrCode {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let qr = QrCode {
            id,
            worker_id,
            purpose: format!("Flyer {id}"),
            username: None,
            product_code: None,
            target_url: target_url.to_string(),
            tracking_url: token.to_string(),
            customization: QrCustomization::default(),
            scan_count: 0,
            created_at: Utc::now(),
        };
        store.qr_codes.push(qr.clone());
        qr
    }

    pub fn insert_scan(&self, qr_code_id: i64, scanned_at: DateTime<Utc>) {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        store.scans.push(Scan {
            id,
            qr_code_id,
            scanned_at,
            user_agent: Some("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0) Safari".to_string()),
            referrer: None,
            utm: Default::default(),
        });
        bump_counters(&mut store, qr_code_id);
    }
}

fn bump_counters(store: &mut Store, qr_code_id: i64) {
    let worker_id = store
        .qr_codes
        .iter_mut()
        .find(|q| q.id == qr_code_id)
        .map(|q| {
            q.scan_count += 1;
            q.worker_id
        });
    if let Some(worker_id) = worker_id
        && let Some(w) = store.workers.iter_mut().find(|w| w.id == worker_id)
    {
        w.visits_count += 1;
    }
}

#[async_trait]
impl WorkerRepository for MemoryRepository {
    async fn create(&self, new_worker: NewWorker) -> Result<Worker, AppError> {
        let mut store = self.store.lock().unwrap();
        if store.workers.iter().any(|w| w.code == new_worker.code) {
            return Err(AppError::conflict("Resource already exists", json!({})));
        }
        let id = store.next_id();
        let worker = Worker::new(id, new_worker.name, new_worker.code, 0, Utc::now());
        store.workers.push(worker.clone());
        Ok(worker)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Worker>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.workers.iter().find(|w| w.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Worker>, AppError> {
        Ok(self.store.lock().unwrap().workers.clone())
    }

    async fn counts(&self) -> Result<Vec<WorkerCounts>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .workers
            .iter()
            .map(|w| {
                let codes: Vec<i64> = store
                    .qr_codes
                    .iter()
                    .filter(|q| q.worker_id == w.id)
                    .map(|q| q.id)
                    .collect();
                let scans = store
                    .scans
                    .iter()
                    .filter(|s| codes.contains(&s.qr_code_id))
                    .count();
                WorkerCounts {
                    worker_id: w.id,
                    qr_codes: codes.len() as i64,
                    scans: scans as i64,
                }
            })
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut store = self.store.lock().unwrap();
        let before = store.workers.len();
        store.workers.retain(|w| w.id != id);
        let removed: Vec<i64> = store
            .qr_codes
            .iter()
            .filter(|q| q.worker_id == id)
            .map(|q| q.id)
            .collect();
        store.qr_codes.retain(|q| q.worker_id != id);
        store.scans.retain(|s| !removed.contains(&s.qr_code_id));
        Ok(store.workers.len() < before)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.store.lock().unwrap().workers.len() as i64)
    }
}

#[async_trait]
impl QrCodeRepository for MemoryRepository {
    async fn create(&self, new_qr_code: NewQrCode) -> Result<QrCode, AppError> {
        let mut store = self.store.lock().unwrap();
        if !store.workers.iter().any(|w| w.id == new_qr_code.worker_id) {
            return Err(AppError::bad_request(
                "Referenced resource does not exist",
                json!({ "constraint": "qr_codes_worker_id_fkey" }),
            ));
        }
        if store
            .qr_codes
            .iter()
            .any(|q| q.tracking_url == new_qr_code.tracking_url)
        {
            return Err(AppError::conflict("Resource already exists", json!({})));
        }
        let id = store.next_id();
        let qr = QrCode {
            id,
            worker_id: new_qr_code.worker_id,
            purpose: new_qr_code.purpose,
            username: new_qr_code.username,
            product_code: new_qr_code.product_code,
            target_url: new_qr_code.target_url,
            tracking_url: new_qr_code.tracking_url,
            customization: new_qr_code.customization,
            scan_count: 0,
            created_at: Utc::now(),
        };
        store.qr_codes.push(qr.clone());
        Ok(qr)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<QrCode>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.qr_codes.iter().find(|q| q.id == id).cloned())
    }

    async fn find_by_tracking_token(&self, token: &str) -> Result<Option<QrCode>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .qr_codes
            .iter()
            .find(|q| q.tracking_url == token)
            .cloned())
    }

    async fn list(&self, worker_id: Option<i64>) -> Result<Vec<QrCode>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .qr_codes
            .iter()
            .filter(|q| worker_id.is_none_or(|id| q.worker_id == id))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut store = self.store.lock().unwrap();
        let before = store.qr_codes.len();
        store.qr_codes.retain(|q| q.id != id);
        store.scans.retain(|s| s.qr_code_id != id);
        Ok(store.qr_codes.len() < before)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.store.lock().unwrap().qr_codes.len() as i64)
    }
}

#[async_trait]
impl ScanRepository for MemoryRepository {
    async fn record_scan(&self, new_scan: NewScan) -> Result<Scan, AppError> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let scan = Scan {
            id,
            qr_code_id: new_scan.qr_code_id,
            scanned_at: Utc::now(),
            user_agent: new_scan.user_agent,
            referrer: new_scan.referrer,
            utm: new_scan.utm,
        };
        store.scans.push(scan.clone());
        bump_counters(&mut store, new_scan.qr_code_id);
        Ok(scan)
    }

    async fn record_location(&self, location: NewScanLocation) -> Result<ScanLocation, AppError> {
        let mut store = self.store.lock().unwrap();
        let location = ScanLocation {
            scan_id: location.scan_id,
            latitude: location.latitude,
            longitude: location.longitude,
            accuracy: location.accuracy,
            city: location.city,
            country: location.country,
        };
        store.locations.push(location.clone());
        Ok(location)
    }

    async fn list_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ScanDetails>, AppError> {
        let store = self.store.lock().unwrap();
        let mut details: Vec<ScanDetails> = store
            .scans
            .iter()
            .filter(|s| since.is_none_or(|since| s.scanned_at >= since))
            .map(|s| {
                let qr = store.qr_codes.iter().find(|q| q.id == s.qr_code_id);
                let worker = qr.and_then(|q| store.workers.iter().find(|w| w.id == q.worker_id));
                ScanDetails {
                    id: s.id,
                    qr_code_id: s.qr_code_id,
                    scanned_at: s.scanned_at,
                    user_agent: s.user_agent.clone(),
                    referrer: s.referrer.clone(),
                    purpose: qr.map(|q| q.purpose.clone()),
                    worker_name: worker.map(|w| w.name.clone()),
                    location: store
                        .locations
                        .iter()
                        .find(|l| l.scan_id == s.id)
                        .cloned(),
                }
            })
            .collect();
        details.sort_by(|a, b| b.scanned_at.cmp(&a.scanned_at));
        Ok(details)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.store.lock().unwrap().scans.len() as i64)
    }
}

#[async_trait]
impl AuditLogRepository for MemoryRepository {
    async fn record(&self, entry: NewAuditLog) -> Result<AuditLog, AppError> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let log = AuditLog {
            id,
            user_id: entry.user_id,
            action: entry.action,
            resource_type: entry.resource_type,
            resource_id: entry.resource_id,
            details: entry.details,
            created_at: Utc::now(),
        };
        store.audit_logs.push(log.clone());
        Ok(log)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<AuditLog>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .audit_logs
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TokenRepository for MemoryRepository {
    async fn validate_token(&self, token_hash: &str) -> Result<bool, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .tokens
            .iter()
            .any(|t| t.token_hash == token_hash && t.is_active()))
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        let mut store = self.store.lock().unwrap();
        if let Some(t) = store.tokens.iter_mut().find(|t| t.token_hash == token_hash) {
            t.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_token(&self, name: &str, token_hash: &str) -> Result<ApiToken, AppError> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let token = ApiToken {
            id,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        store.tokens.push(token.clone());
        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        Ok(self.store.lock().unwrap().tokens.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.tokens.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.tokens.iter().find(|t| t.name == name).cloned())
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        let mut store = self.store.lock().unwrap();
        if let Some(t) = store
            .tokens
            .iter_mut()
            .find(|t| t.id == id && t.revoked_at.is_none())
        {
            t.revoked_at = Some(Utc::now());
        }
        Ok(())
    }
}

/// State wired to one in-memory store, with a token for [`API_TOKEN`].
pub fn create_test_state() -> (AppState, mpsc::Receiver<ScanEvent>, MemoryRepository) {
    let repo = MemoryRepository::default();
    let (tx, rx) = mpsc::channel(100);
    let cache = Arc::new(NullCache::new());

    {
        let mut store = repo.store.lock().unwrap();
        let id = store.next_id();
        store.tokens.push(ApiToken {
            id,
            name: "tests".to_string(),
            token_hash: hash_token(SIGNING_SECRET, API_TOKEN),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        });
    }

    let shared = Arc::new(repo.clone());
    let workers: Arc<dyn WorkerRepository> = shared.clone();
    let qr_codes: Arc<dyn QrCodeRepository> = shared.clone();
    let scans: Arc<dyn ScanRepository> = shared.clone();
    let audit_log: Arc<dyn AuditLogRepository> = shared.clone();
    let tokens: Arc<dyn TokenRepository> = shared;

    let state = AppState {
        worker_service: Arc::new(WorkerService::new(workers.clone())),
        qr_code_service: Arc::new(QrCodeService::new(
            qr_codes.clone(),
            audit_log.clone(),
            cache.clone(),
            PUBLIC_BASE_URL.to_string(),
        )),
        redirect_service: Arc::new(RedirectService::new(qr_codes.clone(), cache.clone())),
        stats_service: Arc::new(StatsService::new(workers, qr_codes, scans)),
        audit_service: Arc::new(AuditService::new(audit_log)),
        auth_service: Arc::new(AuthService::new(tokens, SIGNING_SECRET.to_string())),
        cache,
        scan_sender: tx,
        device_reports: Arc::new(DeviceReports::new()),
        device_location_timeout_ms: 5000,
        behind_proxy: false,
    };

    (state, rx, repo)
}

/// Reverse geocoder that always answers with Chisinau, Moldova.
pub struct FixedGeocoder;

#[async_trait]
impl ReverseGeocoder for FixedGeocoder {
    async fn reverse(&self, _latitude: f64, _longitude: f64) -> Result<Place, GeoError> {
        Ok(Place {
            city: Some("Chisinau".to_string()),
            country: Some("Moldova".to_string()),
        })
    }
}

/// IP locator that always answers with Berlin, Germany.
pub struct FixedIpLocator;

#[async_trait]
impl IpLocator for FixedIpLocator {
    async fn locate(&self, _ip: std::net::IpAddr) -> Result<IpLocation, GeoError> {
        Ok(IpLocation {
            latitude: 52.52,
            longitude: 13.405,
            city: Some("Berlin".to_string()),
            country: Some("Germany".to_string()),
        })
    }
}

/// `/api` routes behind bearer authentication, without rate limiting.
pub fn api_server(state: AppState) -> TestServer {
    let app = Router::new()
        .nest(
            "/api",
            protected_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::layer,
            )),
        )
        .with_state(state);

    TestServer::new(app).unwrap()
}

pub fn bearer() -> String {
    format!("Bearer {API_TOKEN}")
}

/// Inserts `ConnectInfo` so handlers extracting the peer address work
/// without a real socket.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "203.0.113.7:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
