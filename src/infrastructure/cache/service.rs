//! Cache service trait and error types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// What the redirect page needs to know about a tracking token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedTarget {
    pub qr_code_id: i64,
    pub target_url: String,
}

/// Trait for caching tracking token lookups.
///
/// Implementations must be thread-safe and handle errors gracefully without
/// disrupting the application (cache failures should degrade to database lookups).
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the cached target for a tracking token.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(target))` on cache hit
    /// - `Ok(None)` on cache miss
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend fails; callers fall back to the
    /// database.
    async fn get_target(&self, token: &str) -> CacheResult<Option<CachedTarget>>;

    /// Stores a target with an optional TTL in seconds (implementation default if `None`).
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend fails.
    async fn set_target(
        &self,
        token: &str,
        target: &CachedTarget,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Removes a cached target. Used when a QR code is deleted.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend fails.
    async fn invalidate(&self, token: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
