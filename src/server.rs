//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, geolocation clients, the scan
//! worker, and the Axum server lifecycle.

use crate::application::services::{
    AuditService, AuthService, QrCodeService, RedirectService, ScanRecorder, StatsService,
    WorkerService,
};
use crate::config::Config;
use crate::domain::device_reports::DeviceReports;
use crate::domain::geo::{DeviceLocator, IpLocator, ReverseGeocoder};
use crate::domain::repositories::{
    AuditLogRepository, QrCodeRepository, ScanRepository, TokenRepository, WorkerRepository,
};
use crate::domain::scan_worker::run_scan_worker;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::geo::{
    DEVICE_REPORT_GRACE, IpApiLocator, NominatimGeocoder, ReportedPositionLocator, http_client,
};
use crate::infrastructure::persistence::{
    PgAuditLogRepository, PgQrCodeRepository, PgScanRepository, PgTokenRepository,
    PgWorkerRepository,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// How long in-flight scan events may take to finish after shutdown.
const SCAN_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis cache (or NullCache fallback)
/// - Background scan worker with geolocation adapters
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - The geolocation HTTP client cannot be built
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Migrations applied");

    let cache = connect_cache(&config).await;

    let pool = Arc::new(pool);
    let workers: Arc<dyn WorkerRepository> = Arc::new(PgWorkerRepository::new(pool.clone()));
    let qr_codes: Arc<dyn QrCodeRepository> = Arc::new(PgQrCodeRepository::new(pool.clone()));
    let scans: Arc<dyn ScanRepository> = Arc::new(PgScanRepository::new(pool.clone()));
    let audit_log: Arc<dyn AuditLogRepository> =
        Arc::new(PgAuditLogRepository::new(pool.clone()));
    let tokens: Arc<dyn TokenRepository> = Arc::new(PgTokenRepository::new(pool.clone()));

    let client = http_client(
        &config.geo_user_agent,
        Duration::from_secs(config.geo_http_timeout_secs),
    )
    .context("Failed to build geolocation HTTP client")?;
    let ip_locator: Arc<dyn IpLocator> = Arc::new(IpApiLocator::new(
        client.clone(),
        config.ip_geolocation_url.clone(),
    ));
    let geocoder: Arc<dyn ReverseGeocoder> = Arc::new(NominatimGeocoder::new(
        client,
        config.reverse_geocoding_url.clone(),
    ));
    let device_reports = Arc::new(DeviceReports::new());
    let device: Arc<dyn DeviceLocator> =
        Arc::new(ReportedPositionLocator::new(device_reports.clone()));

    // The page gives the browser the configured timeout; the worker also
    // waits for the report to arrive.
    let recorder = ScanRecorder::new(
        scans.clone(),
        device,
        geocoder,
        ip_locator,
        Duration::from_millis(config.device_location_timeout_ms) + DEVICE_REPORT_GRACE,
    );

    let (scan_tx, scan_rx) = mpsc::channel(config.scan_queue_capacity);
    let scan_worker = tokio::spawn(run_scan_worker(
        scan_rx,
        Arc::new(recorder),
        config.scan_worker_concurrency,
    ));
    tracing::info!(
        concurrency = config.scan_worker_concurrency,
        "Scan worker started"
    );

    let state = AppState {
        worker_service: Arc::new(WorkerService::new(workers.clone())),
        qr_code_service: Arc::new(QrCodeService::new(
            qr_codes.clone(),
            audit_log.clone(),
            cache.clone(),
            config.public_base_url.clone(),
        )),
        redirect_service: Arc::new(RedirectService::new(qr_codes.clone(), cache.clone())),
        stats_service: Arc::new(StatsService::new(workers, qr_codes, scans)),
        audit_service: Arc::new(AuditService::new(audit_log)),
        auth_service: Arc::new(AuthService::new(
            tokens,
            config.token_signing_secret.clone(),
        )),
        cache,
        scan_sender: scan_tx,
        device_reports,
        device_location_timeout_ms: config.device_location_timeout_ms,
        behind_proxy: config.behind_proxy,
    };

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router owned every sender; the worker drains what is queued and stops.
    match tokio::time::timeout(SCAN_DRAIN_TIMEOUT, scan_worker).await {
        Ok(Ok(())) => tracing::info!("Scan queue drained"),
        Ok(Err(e)) => tracing::error!("Scan worker panicked: {}", e),
        Err(_) => tracing::warn!("Scan queue not drained within {:?}", SCAN_DRAIN_TIMEOUT),
    }

    Ok(())
}

async fn connect_database(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
