//! QR code creation, listing and deletion.

use std::sync::Arc;

use crate::domain::entities::{NewAuditLog, NewQrCode, QrCode, QrCustomization};
use crate::domain::listing::ListQuery;
use crate::domain::repositories::{AuditLogRepository, QrCodeRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::generate_tracking_token;
use crate::utils::url_validator::{is_hex_color, validate_target_url};
use serde_json::json;

/// Smallest and largest rendered QR size in pixels.
pub const QR_SIZE_RANGE: std::ops::RangeInclusive<u32> = 64..=2048;

/// Input for creating a QR code.
#[derive(Debug, Clone)]
pub struct CreateQrCode {
    pub worker_id: i64,
    pub purpose: String,
    pub username: Option<String>,
    pub product_code: Option<String>,
    pub target_url: String,
    pub customization: QrCustomization,
}

/// A newly created QR code together with the URL to encode in the image.
#[derive(Debug, Clone)]
pub struct CreatedQrCode {
    pub qr_code: QrCode,
    pub redirect_url: String,
}

/// Service for managing QR codes.
///
/// Creation and deletion are recorded in the audit log on a best-effort
/// basis: an audit failure is logged and never fails the request.
pub struct QrCodeService<Q, A>
where
    Q: QrCodeRepository + ?Sized,
    A: AuditLogRepository + ?Sized,
{
    qr_codes: Arc<Q>,
    audit_log: Arc<A>,
    cache: Arc<dyn CacheService>,
    public_base_url: String,
}

impl<Q, A> QrCodeService<Q, A>
where
    Q: QrCodeRepository + ?Sized,
    A: AuditLogRepository + ?Sized,
{
    /// Creates a new QR code service.
    ///
    /// `public_base_url` is the origin visitors reach, e.g.
    /// `https://qr.example.com`; redirect URLs are built as
    /// `{public_base_url}/r/{token}`.
    pub fn new(
        qr_codes: Arc<Q>,
        audit_log: Arc<A>,
        cache: Arc<dyn CacheService>,
        public_base_url: String,
    ) -> Self {
        Self {
            qr_codes,
            audit_log,
            cache,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Public redirect URL for a tracking token.
    pub fn redirect_url(&self, tracking_token: &str) -> String {
        format!("{}/r/{}", self.public_base_url, tracking_token)
    }

    /// Creates a QR code with a fresh 26-character tracking token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the purpose is blank, the target
    /// URL is not an HTTP(S) URL, a color is not a hex color, the size is out
    /// of range, or the worker does not exist.
    /// Returns [`AppError::Conflict`] if the tracking token collides.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn create_qr_code(&self, input: CreateQrCode) -> Result<CreatedQrCode, AppError> {
        let purpose = input.purpose.trim().to_string();
        if purpose.is_empty() {
            return Err(AppError::bad_request(
                "Purpose must not be empty",
                json!({ "field": "purpose" }),
            ));
        }

        let target_url = validate_target_url(&input.target_url).map_err(|e| {
            AppError::bad_request("Invalid target URL", json!({ "reason": e.to_string() }))
        })?;

        validate_customization(&input.customization)?;

        let new_qr_code = NewQrCode {
            worker_id: input.worker_id,
            purpose,
            username: non_blank(input.username),
            product_code: non_blank(input.product_code),
            target_url,
            tracking_url: generate_tracking_token(),
            customization: input.customization,
        };

        let qr_code = self.qr_codes.create(new_qr_code).await?;
        tracing::info!(
            qr_code_id = qr_code.id,
            worker_id = qr_code.worker_id,
            "QR code created"
        );

        self.audit(NewAuditLog::qr_code(
            "create",
            qr_code.worker_id,
            qr_code.id,
            json!({
                "purpose": qr_code.purpose,
                "target_url": qr_code.target_url,
                "product_code": qr_code.product_code,
            }),
        ))
        .await;

        let redirect_url = self.redirect_url(&qr_code.tracking_url);
        Ok(CreatedQrCode {
            qr_code,
            redirect_url,
        })
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no QR code has this ID.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn get_qr_code(&self, id: i64) -> Result<QrCode, AppError> {
        self.qr_codes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("QR code not found", json!({ "id": id })))
    }

    /// Lists QR codes, optionally for one worker.
    ///
    /// `query.search` matches purpose, username or product code
    /// case-insensitively; results are sorted by purpose.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list_qr_codes(
        &self,
        worker_id: Option<i64>,
        query: &ListQuery,
    ) -> Result<Vec<QrCode>, AppError> {
        let mut qr_codes: Vec<QrCode> = self
            .qr_codes
            .list(worker_id)
            .await?
            .into_iter()
            .filter(|qr| query.search_term().is_none_or(|term| qr.matches(term)))
            .collect();

        qr_codes.sort_by(|a, b| query.sort.compare(&a.purpose, &b.purpose));
        Ok(qr_codes)
    }

    /// Deletes a QR code, its scans and its cached redirect target.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no QR code has this ID.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn delete_qr_code(&self, id: i64) -> Result<(), AppError> {
        let qr_code = self.get_qr_code(id).await?;

        if !self.qr_codes.delete(id).await? {
            return Err(AppError::not_found("QR code not found", json!({ "id": id })));
        }
        tracing::info!(qr_code_id = id, "QR code deleted");

        if let Err(e) = self.cache.invalidate(&qr_code.tracking_url).await {
            tracing::warn!(qr_code_id = id, "Failed to invalidate cached target: {}", e);
        }

        self.audit(NewAuditLog::qr_code(
            "delete",
            qr_code.worker_id,
            qr_code.id,
            json!({
                "purpose": qr_code.purpose,
                "target_url": qr_code.target_url,
                "scan_count": qr_code.scan_count,
            }),
        ))
        .await;

        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn count_qr_codes(&self) -> Result<i64, AppError> {
        self.qr_codes.count().await
    }

    /// Drops cached redirect targets for codes removed by a cascade, such as
    /// the QR codes of a deleted worker. Failures are logged.
    pub async fn forget_cached_targets(&self, qr_codes: &[QrCode]) {
        for qr_code in qr_codes {
            if let Err(e) = self.cache.invalidate(&qr_code.tracking_url).await {
                tracing::warn!(
                    qr_code_id = qr_code.id,
                    "Failed to invalidate cached target: {}",
                    e
                );
            }
        }
    }

    async fn audit(&self, entry: NewAuditLog) {
        let action = entry.action.clone();
        if let Err(e) = self.audit_log.record(entry).await {
            tracing::warn!(action = %action, "Failed to write audit log entry: {}", e);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_customization(customization: &QrCustomization) -> Result<(), AppError> {
    for (field, color) in [
        ("fgColor", &customization.fg_color),
        ("bgColor", &customization.bg_color),
    ] {
        if !is_hex_color(color) {
            return Err(AppError::bad_request(
                "Color must be a hex value like #1A2B3C",
                json!({ "field": field, "value": color }),
            ));
        }
    }

    if !QR_SIZE_RANGE.contains(&customization.size) {
        return Err(AppError::bad_request(
            "QR size out of range",
            json!({
                "field": "size",
                "min": QR_SIZE_RANGE.start(),
                "max": QR_SIZE_RANGE.end(),
            }),
        ));
    }

    Ok(())
}
