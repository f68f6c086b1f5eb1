//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService, CachedTarget};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

/// Redis cache of tracking token lookups.
///
/// Entries are JSON-encoded [`CachedTarget`] values under `qr:{token}`.
/// Uses `ConnectionManager` for automatic reconnection.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and configures the default TTL.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `default_ttl_seconds` - TTL applied when [`CacheService::set_target`] is called
    ///   without one; controlled via `CACHE_TTL_SECONDS`
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
            key_prefix: "qr:".to_string(),
        })
    }

    fn build_key(&self, token: &str) -> String {
        format!("{}{}", self.key_prefix, token)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_target(&self, token: &str) -> CacheResult<Option<CachedTarget>> {
        let key = self.build_key(token);
        let mut conn = self.client.clone();

        let raw = conn
            .get::<_, Option<String>>(&key)
            .await
            .map_err(|e| CacheError::OperationError(format!("GET {key}: {e}")))?;

        match raw {
            Some(raw) => match serde_json::from_str::<CachedTarget>(&raw) {
                Ok(target) => {
                    debug!("Cache HIT: {}", token);
                    Ok(Some(target))
                }
                Err(e) => {
                    warn!("Dropping undecodable cache entry {}: {}", key, e);
                    let _ = conn.del::<_, i32>(&key).await;
                    Ok(None)
                }
            },
            None => {
                debug!("Cache MISS: {}", token);
                Ok(None)
            }
        }
    }

    async fn set_target(
        &self,
        token: &str,
        target: &CachedTarget,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let key = self.build_key(token);
        let mut conn = self.client.clone();
        let ttl_seconds = ttl_seconds.unwrap_or(self.default_ttl);
        let payload = serde_json::to_string(target)
            .map_err(|e| CacheError::OperationError(format!("encode {key}: {e}")))?;

        conn.set_ex::<_, _, ()>(&key, payload, ttl_seconds)
            .await
            .map_err(|e| CacheError::OperationError(format!("SET {key}: {e}")))?;

        debug!("Cache SET: {} (TTL: {}s)", token, ttl_seconds);
        Ok(())
    }

    async fn invalidate(&self, token: &str) -> CacheResult<()> {
        let key = self.build_key(token);
        let mut conn = self.client.clone();

        let deleted = conn
            .del::<_, i32>(&key)
            .await
            .map_err(|e| CacheError::OperationError(format!("DEL {key}: {e}")))?;

        if deleted > 0 {
            debug!("Cache INVALIDATE: {}", token);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
