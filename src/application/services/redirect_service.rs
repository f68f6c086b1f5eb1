//! Tracking token resolution for the redirect page.

use std::sync::Arc;

use crate::domain::destination::resolve_destination;
use crate::domain::repositories::QrCodeRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, CachedTarget};
use crate::utils::code_generator::is_valid_tracking_token;
use serde_json::json;
use tracing::{debug, error, warn};

/// Where a tracking token leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRedirect {
    pub qr_code_id: i64,
    /// The stored target URL.
    pub target_url: String,
    /// The URL the visitor is actually sent to, after legacy rewrites.
    pub destination: String,
}

/// Resolves tracking tokens, cache first, then database.
pub struct RedirectService<Q: QrCodeRepository + ?Sized> {
    qr_codes: Arc<Q>,
    cache: Arc<dyn CacheService>,
}

impl<Q: QrCodeRepository + ?Sized> RedirectService<Q> {
    pub fn new(qr_codes: Arc<Q>, cache: Arc<dyn CacheService>) -> Self {
        Self { qr_codes, cache }
    }

    /// Looks up the QR code behind `token`.
    ///
    /// # Cache Strategy
    ///
    /// - **Hit**: no database access
    /// - **Miss**: database lookup, then the cache is filled in the background
    /// - **Cache error**: logged, falls back to the database
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the token is malformed or unknown.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn resolve(&self, token: &str) -> Result<ResolvedRedirect, AppError> {
        if !is_valid_tracking_token(token) {
            return Err(not_found());
        }

        let target = match self.cache.get_target(token).await {
            Ok(Some(cached)) => {
                debug!("Cache HIT for {}", token);
                cached
            }
            Ok(None) => {
                debug!("Cache MISS for {}", token);
                let target = self.lookup(token).await?;

                let cache = self.cache.clone();
                let token = token.to_string();
                let to_cache = target.clone();
                tokio::spawn(async move {
                    if let Err(e) = cache.set_target(&token, &to_cache, None).await {
                        error!("Failed to cache redirect target: {}", e);
                    }
                });

                target
            }
            Err(e) => {
                warn!("Cache error, falling back to database: {}", e);
                self.lookup(token).await?
            }
        };

        Ok(ResolvedRedirect {
            qr_code_id: target.qr_code_id,
            destination: resolve_destination(&target.target_url),
            target_url: target.target_url,
        })
    }

    async fn lookup(&self, token: &str) -> Result<CachedTarget, AppError> {
        let qr_code = self
            .qr_codes
            .find_by_tracking_token(token)
            .await?
            .ok_or_else(not_found)?;

        Ok(CachedTarget {
            qr_code_id: qr_code.id,
            target_url: qr_code.target_url,
        })
    }
}

fn not_found() -> AppError {
    AppError::not_found("QR code not found", json!({}))
}
