//! Client IP resolution from the peer address and proxy headers.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Resolves the address of the visitor.
///
/// Forwarding headers are only trusted when the service runs behind a
/// reverse proxy; otherwise anyone could claim an arbitrary address. The
/// first valid entry of `X-Forwarded-For` wins, then `X-Real-IP`, then the
/// socket peer.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// let ip = resolve_client_ip(&headers, Some(peer), true);
/// assert_eq!(ip, Some("203.0.113.7".parse().unwrap()));
/// ```
pub fn resolve_client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    behind_proxy: bool,
) -> Option<IpAddr> {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());

        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<IpAddr>().ok())
        };

        if let Some(ip) = forwarded.or_else(real_ip) {
            return Some(ip);
        }
    }

    peer.map(|addr| addr.ip())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("198.51.100.1:5000".parse().unwrap())
    }

    #[test]
    fn test_direct_uses_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));

        let ip = resolve_client_ip(&headers, peer(), false);
        assert_eq!(ip, Some("198.51.100.1".parse().unwrap()));
    }

    #[test]
    fn test_proxy_uses_first_forwarded() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );

        let ip = resolve_client_ip(&headers, peer(), true);
        assert_eq!(ip, Some("203.0.113.7".parse().unwrap()));
    }

    #[test]
    fn test_proxy_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("garbage"));
        headers.insert("x-real-ip", HeaderValue::from_static("2001:db8::5"));

        let ip = resolve_client_ip(&headers, peer(), true);
        assert_eq!(ip, Some("2001:db8::5".parse().unwrap()));
    }

    #[test]
    fn test_proxy_without_headers_uses_peer() {
        let ip = resolve_client_ip(&HeaderMap::new(), peer(), true);
        assert_eq!(ip, Some("198.51.100.1".parse().unwrap()));
    }

    #[test]
    fn test_no_information() {
        assert_eq!(resolve_client_ip(&HeaderMap::new(), None, true), None);
    }
}
