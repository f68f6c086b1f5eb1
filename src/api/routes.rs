//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    audit_log_list_handler, create_qr_code_handler, create_worker_handler, delete_qr_code_handler,
    delete_worker_handler, get_qr_code_handler, get_worker_handler, overview_handler,
    qr_code_list_handler, scan_history_handler, username_summary_handler, worker_activity_handler,
    worker_list_handler,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `GET    /workers`           - List workers with QR code and scan counts
/// - `POST   /workers`           - Create a worker
/// - `GET    /workers/{id}`      - Get a worker
/// - `DELETE /workers/{id}`      - Delete a worker with its QR codes
/// - `GET    /qr-codes`          - List QR codes (optionally per worker)
/// - `POST   /qr-codes`          - Create a QR code
/// - `GET    /qr-codes/{id}`     - Get a QR code
/// - `DELETE /qr-codes/{id}`     - Delete a QR code with its scans
/// - `GET    /stats/overview`    - Totals
/// - `GET    /stats/scans`       - Scans per day for a trailing window
/// - `GET    /stats/workers`     - Per-worker activity
/// - `GET    /stats/usernames`   - Per-username summaries
/// - `GET    /audit-logs`        - Recent audit entries
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/workers",
            get(worker_list_handler).post(create_worker_handler),
        )
        .route(
            "/workers/{id}",
            get(get_worker_handler).delete(delete_worker_handler),
        )
        .route(
            "/qr-codes",
            get(qr_code_list_handler).post(create_qr_code_handler),
        )
        .route(
            "/qr-codes/{id}",
            get(get_qr_code_handler).delete(delete_qr_code_handler),
        )
        .route("/stats/overview", get(overview_handler))
        .route("/stats/scans", get(scan_history_handler))
        .route("/stats/workers", get(worker_activity_handler))
        .route("/stats/usernames", get(username_summary_handler))
        .route("/audit-logs", get(audit_log_list_handler))
}
