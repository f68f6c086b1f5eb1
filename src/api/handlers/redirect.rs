//! Handler for the public redirect page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{ConnectInfo, Path, Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use metrics::counter;
use serde_json::json;
use std::net::SocketAddr;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, warn};
use validator::Validate;

use crate::api::dto::redirect::{DeviceLocationRequest, RedirectParams};
use crate::domain::device_reports::DeliveryError;
use crate::domain::scan_event::ScanEvent;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::resolve_client_ip;
use crate::utils::code_generator::{generate_visit_id, is_valid_visit_id};

/// Delay before the page navigates to the destination.
pub const REDIRECT_DELAY_MS: u64 = 1500;

/// Interstitial page shown while the visitor is forwarded.
///
/// With a `visit_id` the page first asks the browser for a high-accuracy
/// position and posts the outcome to `report_url`; the redirect delay starts
/// once that settles.
#[derive(Template, WebTemplate)]
#[template(path = "redirect.html")]
pub struct RedirectTemplate {
    pub destination: String,
    pub delay_ms: u64,
    pub visit_id: Option<String>,
    pub report_url: String,
    pub locate_timeout_ms: u64,
}

impl RedirectTemplate {
    /// Redirect delay in seconds for the `<noscript>` refresh.
    pub fn refresh_seconds(&self) -> String {
        format!("{}", self.delay_ms as f64 / 1000.0)
    }
}

/// Terminal page for unknown or malformed tracking tokens.
#[derive(Template, WebTemplate)]
#[template(path = "redirect_error.html")]
pub struct RedirectErrorTemplate {
    pub message: String,
}

/// Resolves a tracking token, queues a scan and renders the redirect page.
///
/// # Endpoint
///
/// `GET /r/{token}?utm_source=&utm_medium=&utm_campaign=&lat=&lon=&acc=`
///
/// # Request Flow
///
/// 1. Resolve the token (cache, then database)
/// 2. Queue one scan event for the background worker
/// 3. Render a page that asks the browser for its position, reports it to
///    `POST /r/{token}/location` and navigates to the destination 1500 ms
///    later
///
/// # Scan Tracking
///
/// Recording the scan, locating it and storing the location happen on the
/// scan worker, which waits a bounded time for the browser's report before
/// falling back to IP geolocation. Coordinates passed as `lat`/`lon`/`acc`
/// are used as is and the page does not prompt. If the queue is full the
/// event is dropped and counted in `scan_events_dropped_total`; the visitor
/// is redirected either way.
///
/// # Errors
///
/// Renders the error page with 404 if the token is unknown, 500 on lookup
/// failures. No scan is queued in either case.
pub async fn redirect_handler(
    Path(token): Path<String>,
    query: Result<Query<RedirectParams>, QueryRejection>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    let resolved = match state.redirect_service.resolve(&token).await {
        Ok(resolved) => resolved,
        Err(AppError::NotFound { .. }) => {
            debug!("Unknown tracking token {}", token);
            return error_page(StatusCode::NOT_FOUND, "This QR code is not valid.");
        }
        Err(e) => {
            error!("Failed to resolve tracking token: {}", e);
            return error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Please try again later.",
            );
        }
    };

    let params = query.map(|Query(p)| p).unwrap_or_default();
    let client_ip = resolve_client_ip(&headers, Some(addr), state.behind_proxy);

    let mut event = ScanEvent::new(
        resolved.qr_code_id,
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
        params.utm(),
        client_ip,
    );

    let mut visit_id = None;
    match params.position() {
        Some(position) => event = event.with_position(Some(position)),
        None => {
            let id = generate_visit_id();
            state.device_reports.register(&id, &token);
            event = event.with_visit(id.clone());
            visit_id = Some(id);
        }
    }

    if !enqueue(&state.scan_sender, event, resolved.qr_code_id)
        && let Some(id) = visit_id.take()
    {
        state.device_reports.forget(&id);
    }

    RedirectTemplate {
        destination: resolved.destination,
        delay_ms: REDIRECT_DELAY_MS,
        visit_id,
        report_url: format!("/r/{token}/location"),
        locate_timeout_ms: state.device_location_timeout_ms,
    }
    .into_response()
}

/// Accepts the browser's geolocation outcome for a visit.
///
/// # Endpoint
///
/// `POST /r/{token}/location`
///
/// ```json
/// { "visit_id": "...", "latitude": 47.01, "longitude": 28.86, "accuracy": 12.0 }
/// { "visit_id": "...", "error": "denied" }
/// ```
///
/// # Errors
///
/// Returns 400 for out-of-range or partial coordinates.
/// Returns 404 if the visit is unknown, belongs to another token or is no
/// longer awaited.
/// Returns 409 if the visit already reported.
pub async fn device_location_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<DeviceLocationRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    if !is_valid_visit_id(&payload.visit_id) {
        return Err(unknown_visit(&payload.visit_id));
    }
    let report = payload.report()?;

    match state
        .device_reports
        .deliver(&payload.visit_id, &token, report)
    {
        Ok(()) => {
            debug!(visit_id = %payload.visit_id, "Device location reported");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(DeliveryError::UnknownVisit) => Err(unknown_visit(&payload.visit_id)),
        Err(DeliveryError::AlreadyReported) => Err(AppError::conflict(
            "Location already reported for this visit",
            json!({ "visit_id": payload.visit_id }),
        )),
    }
}

/// Queues a scan without waiting. Returns whether the event was accepted.
fn enqueue(sender: &mpsc::Sender<ScanEvent>, event: ScanEvent, qr_code_id: i64) -> bool {
    match sender.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            counter!("scan_events_dropped_total", "reason" => "full").increment(1);
            warn!(qr_code_id, "Scan queue full, event dropped");
            false
        }
        Err(TrySendError::Closed(_)) => {
            counter!("scan_events_dropped_total", "reason" => "closed").increment(1);
            error!(qr_code_id, "Scan queue closed, event dropped");
            false
        }
    }
}

fn unknown_visit(visit_id: &str) -> AppError {
    AppError::not_found(
        "Visit is not awaiting a location",
        json!({ "visit_id": visit_id }),
    )
}

fn error_page(status: StatusCode, message: &str) -> Response {
    (
        status,
        RedirectErrorTemplate {
            message: message.to_string(),
        },
    )
        .into_response()
}
