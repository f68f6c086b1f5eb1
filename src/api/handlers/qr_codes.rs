//! Handlers for QR code management endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::qr_codes::{
    CreateQrCodeRequest, QrCodeItem, QrCodeListParams, QrCodeListResponse,
};
use crate::error::AppError;
use crate::state::AppState;

/// Lists QR codes, optionally for a single worker.
///
/// # Endpoint
///
/// `GET /api/qr-codes?worker_id=&search=&sort=asc|desc`
pub async fn qr_code_list_handler(
    State(state): State<AppState>,
    Query(params): Query<QrCodeListParams>,
) -> Result<Json<QrCodeListResponse>, AppError> {
    let service = &state.qr_code_service;
    let qr_codes = service
        .list_qr_codes(params.worker_id, &params.list_query())
        .await?;

    Ok(Json(QrCodeListResponse {
        items: qr_codes
            .into_iter()
            .map(|qr| {
                let redirect_url = service.redirect_url(&qr.tracking_url);
                QrCodeItem::new(qr, redirect_url)
            })
            .collect(),
    }))
}

/// Creates a QR code and returns the URL to encode in its image.
///
/// # Endpoint
///
/// `POST /api/qr-codes`
///
/// # Request Body
///
/// ```json
/// {
///   "worker_id": 1,
///   "purpose": "Spring flyer",
///   "username": "store-center",
///   "product_code": "SOFA-12",
///   "target_url": "https://example.com/promo",
///   "customization": { "size": 256, "fgColor": "#000000", "bgColor": "#FFFFFF", "level": "H" }
/// }
/// ```
///
/// # Errors
///
/// Returns 400 if validation fails or the worker does not exist.
/// Returns 409 if the generated tracking token collides.
pub async fn create_qr_code_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateQrCodeRequest>,
) -> Result<(StatusCode, Json<QrCodeItem>), AppError> {
    payload.validate()?;

    let created = state.qr_code_service.create_qr_code(payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(QrCodeItem::new(created.qr_code, created.redirect_url)),
    ))
}

/// # Endpoint
///
/// `GET /api/qr-codes/{id}`
pub async fn get_qr_code_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<QrCodeItem>, AppError> {
    let qr = state.qr_code_service.get_qr_code(id).await?;
    let redirect_url = state.qr_code_service.redirect_url(&qr.tracking_url);

    Ok(Json(QrCodeItem::new(qr, redirect_url)))
}

/// Deletes a QR code with its scans.
///
/// # Endpoint
///
/// `DELETE /api/qr-codes/{id}`
///
/// # Errors
///
/// Returns 404 if the QR code does not exist.
pub async fn delete_qr_code_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.qr_code_service.delete_qr_code(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
