//! DTOs for QR code management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use crate::application::services::qr_code_service::CreateQrCode;
use crate::domain::entities::{QrCode, QrCustomization};
use crate::domain::listing::{ListQuery, SortOrder};

/// Request to create a QR code for a worker.
///
/// The tracking token is generated by the server. Omitted customization
/// fields take their defaults (256 px, black on white, level H).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQrCodeRequest {
    pub worker_id: i64,

    #[validate(length(min = 1, max = 200, message = "Purpose must be 1-200 characters"))]
    pub purpose: String,

    #[validate(length(max = 100))]
    pub username: Option<String>,

    #[validate(length(max = 100))]
    pub product_code: Option<String>,

    #[validate(url(message = "Invalid URL format"))]
    pub target_url: String,

    #[serde(default)]
    pub customization: Option<QrCustomization>,
}

impl From<CreateQrCodeRequest> for CreateQrCode {
    fn from(req: CreateQrCodeRequest) -> Self {
        CreateQrCode {
            worker_id: req.worker_id,
            purpose: req.purpose,
            username: req.username,
            product_code: req.product_code,
            target_url: req.target_url,
            customization: req.customization.unwrap_or_default(),
        }
    }
}

/// `?worker_id=...&search=...&sort=asc|desc`
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct QrCodeListParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub worker_id: Option<i64>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl QrCodeListParams {
    pub fn list_query(&self) -> ListQuery {
        ListQuery {
            search: self.search.clone(),
            sort: self.sort,
        }
    }
}

/// Individual QR code information.
#[derive(Debug, Serialize)]
pub struct QrCodeItem {
    pub id: i64,
    pub worker_id: i64,
    pub purpose: String,
    pub label: String,
    pub username: Option<String>,
    pub product_code: Option<String>,
    pub target_url: String,
    pub tracking_url: String,
    /// URL to encode in the QR image.
    pub redirect_url: String,
    pub customization: QrCustomization,
    pub scan_count: i64,
    pub created_at: DateTime<Utc>,
}

impl QrCodeItem {
    pub fn new(qr: QrCode, redirect_url: String) -> Self {
        QrCodeItem {
            label: qr.label(),
            id: qr.id,
            worker_id: qr.worker_id,
            purpose: qr.purpose,
            username: qr.username,
            product_code: qr.product_code,
            target_url: qr.target_url,
            tracking_url: qr.tracking_url,
            redirect_url,
            customization: qr.customization,
            scan_count: qr.scan_count,
            created_at: qr.created_at,
        }
    }
}

/// Response containing list of QR codes.
#[derive(Debug, Serialize)]
pub struct QrCodeListResponse {
    pub items: Vec<QrCodeItem>,
}
