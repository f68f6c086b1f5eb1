//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Per-client rate limiting layer keyed by `K`.
pub type RateLimitLayer<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Key extractor for the deployment mode.
///
/// Behind a trusted reverse proxy the client is identified by
/// `X-Forwarded-For` / `X-Real-IP` / `Forwarded`; otherwise by the socket
/// peer address.
#[derive(Debug, Clone, Copy)]
pub enum ClientKey {
    Peer,
    Forwarded,
}

impl ClientKey {
    pub fn from_proxy_mode(behind_proxy: bool) -> Self {
        if behind_proxy {
            ClientKey::Forwarded
        } else {
            ClientKey::Peer
        }
    }
}

/// Creates a rate limiter for public endpoints such as the redirect page.
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 100 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
pub fn layer<K: KeyExtractor>(key_extractor: K) -> RateLimitLayer<K> {
    build(key_extractor, 2, 100)
}

/// Creates a stricter rate limiter for authenticated endpoints.
///
/// # Limits
///
/// - **Rate**: 1 request per second
/// - **Burst**: 10 requests
pub fn secure_layer<K: KeyExtractor>(key_extractor: K) -> RateLimitLayer<K> {
    build(key_extractor, 1, 10)
}

fn build<K: KeyExtractor>(key_extractor: K, per_second: u64, burst_size: u32) -> RateLimitLayer<K> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(per_second)
            .burst_size(burst_size)
            .key_extractor(key_extractor)
            .finish()
            .expect("rate limit period and burst size are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

/// Applies the public limiter with the extractor `key` selects.
pub fn public<S>(router: axum::Router<S>, key: ClientKey) -> axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    match key {
        ClientKey::Peer => router.layer(layer(PeerIpKeyExtractor)),
        ClientKey::Forwarded => router.layer(layer(SmartIpKeyExtractor)),
    }
}

/// Applies the strict limiter with the extractor `key` selects.
pub fn secure<S>(router: axum::Router<S>, key: ClientKey) -> axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    match key {
        ClientKey::Peer => router.layer(secure_layer(PeerIpKeyExtractor)),
        ClientKey::Forwarded => router.layer(secure_layer(SmartIpKeyExtractor)),
    }
}
