//! Handlers for worker management endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::list::ListParams;
use crate::api::dto::workers::{CreateWorkerRequest, WorkerItem, WorkerListResponse};
use crate::domain::listing::ListQuery;
use crate::error::AppError;
use crate::state::AppState;

/// Lists workers with their QR code and scan counts.
///
/// # Endpoint
///
/// `GET /api/workers?search=&sort=asc|desc`
pub async fn worker_list_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<WorkerListResponse>, AppError> {
    let summaries = state.worker_service.list_workers(&params.into()).await?;

    Ok(Json(WorkerListResponse {
        items: summaries.into_iter().map(WorkerItem::from).collect(),
    }))
}

/// Creates a worker with a generated code.
///
/// # Endpoint
///
/// `POST /api/workers`
///
/// # Errors
///
/// Returns 400 if the name is empty or too long.
/// Returns 409 if the generated code collides.
pub async fn create_worker_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkerRequest>,
) -> Result<(StatusCode, Json<WorkerItem>), AppError> {
    payload.validate()?;

    let worker = state.worker_service.create_worker(&payload.name).await?;

    Ok((StatusCode::CREATED, Json(worker.into())))
}

/// # Endpoint
///
/// `GET /api/workers/{id}`
pub async fn get_worker_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<WorkerItem>, AppError> {
    let worker = state.worker_service.get_worker(id).await?;
    Ok(Json(worker.into()))
}

/// Deletes a worker together with its QR codes and scans.
///
/// # Endpoint
///
/// `DELETE /api/workers/{id}`
///
/// Cached redirect targets of the removed QR codes are invalidated so their
/// tracking links stop resolving immediately.
///
/// # Errors
///
/// Returns 404 if the worker does not exist.
pub async fn delete_worker_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let owned = state
        .qr_code_service
        .list_qr_codes(Some(id), &ListQuery::default())
        .await?;

    state.worker_service.delete_worker(id).await?;
    state.qr_code_service.forget_cached_targets(&owned).await;

    Ok(StatusCode::NO_CONTENT)
}
