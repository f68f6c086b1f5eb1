//! Handlers for statistics endpoints.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::dto::stats::{
    OverviewResponse, ScanHistoryParams, ScanHistoryResponse, UsernameParams,
    UsernameSummaryResponse, WorkerActivityResponse,
};
use crate::error::AppError;
use crate::state::AppState;

/// Totals of workers, QR codes and scans.
///
/// # Endpoint
///
/// `GET /api/stats/overview`
pub async fn overview_handler(
    State(state): State<AppState>,
) -> Result<Json<OverviewResponse>, AppError> {
    let overview = state.stats_service.overview().await?;
    Ok(Json(overview.into()))
}

/// Scans per day over a trailing window plus the scans themselves.
///
/// # Endpoint
///
/// `GET /api/stats/scans?range=week|month|year&utc_offset_minutes=120`
///
/// # Response
///
/// ```json
/// {
///   "range": "week",
///   "since": "2024-05-01T10:00:00Z",
///   "total_scans": 1520,
///   "scans_in_range": 42,
///   "buckets": [{ "date": "2024-05-02", "count": 17 }],
///   "recent": [{ "id": 9, "purpose": "Flyer", "device": "Mozilla/5.0 (iPhone; ...)", ... }]
/// }
/// ```
///
/// # Errors
///
/// Returns 400 if the UTC offset is outside -720..=840 minutes.
pub async fn scan_history_handler(
    State(state): State<AppState>,
    Query(params): Query<ScanHistoryParams>,
) -> Result<Json<ScanHistoryResponse>, AppError> {
    let history = state
        .stats_service
        .scan_history(params.range, params.utc_offset_minutes.unwrap_or(0))
        .await?;

    Ok(Json(history.into()))
}

/// Per-worker activity ranked by total scans.
///
/// # Endpoint
///
/// `GET /api/stats/workers`
pub async fn worker_activity_handler(
    State(state): State<AppState>,
) -> Result<Json<WorkerActivityResponse>, AppError> {
    let items = state.stats_service.worker_activity().await?;
    Ok(Json(WorkerActivityResponse { items }))
}

/// Per-username summaries.
///
/// # Endpoint
///
/// `GET /api/stats/usernames?q=`
pub async fn username_summary_handler(
    State(state): State<AppState>,
    Query(params): Query<UsernameParams>,
) -> Result<Json<UsernameSummaryResponse>, AppError> {
    let items = state.stats_service.usernames(params.q.as_deref()).await?;
    Ok(Json(UsernameSummaryResponse { items }))
}
