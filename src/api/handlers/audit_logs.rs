//! Handler for the audit log endpoint.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::dto::audit_logs::{AuditLogItem, AuditLogListResponse, AuditLogParams};
use crate::error::AppError;
use crate::state::AppState;

/// Most recent audit entries, newest first.
///
/// # Endpoint
///
/// `GET /api/audit-logs?limit=50`
///
/// `limit` defaults to 50 and is clamped to 1..=500.
pub async fn audit_log_list_handler(
    State(state): State<AppState>,
    Query(params): Query<AuditLogParams>,
) -> Result<Json<AuditLogListResponse>, AppError> {
    let entries = state.audit_service.recent(params.limit).await?;

    Ok(Json(AuditLogListResponse {
        items: entries.into_iter().map(AuditLogItem::from).collect(),
    }))
}
