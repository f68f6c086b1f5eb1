//! Geolocation contracts used by the scan pipeline.
//!
//! Three independent sources can place a scan on the map:
//!
//! - [`DeviceLocator`] - precise coordinates reported by the visitor's device
//! - [`ReverseGeocoder`] - turns coordinates into a city and country
//! - [`IpLocator`] - coarse position derived from the client IP address
//!
//! All of them are best effort. Callers treat every [`GeoError`] as "no data".

use std::net::IpAddr;

use async_trait::async_trait;

use crate::domain::scan_event::ScanEvent;

/// Coordinates reported by a device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevicePosition {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in meters.
    pub accuracy: Option<f64>,
}

impl DevicePosition {
    /// Builds a position, rejecting coordinates outside the WGS84 range.
    pub fn new(latitude: f64, longitude: f64, accuracy: Option<f64>) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return None;
        }

        let accuracy = accuracy.filter(|a| a.is_finite() && *a >= 0.0);
        Some(Self {
            latitude,
            longitude,
            accuracy,
        })
    }
}

/// Human-readable place name for a coordinate pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Place {
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Coarse location resolved from an IP address.
#[derive(Debug, Clone, PartialEq)]
pub struct IpLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Failure of a single geolocation attempt.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("location permission denied")]
    Denied,
    #[error("location lookup timed out")]
    Timeout,
    #[error("location service unavailable: {0}")]
    Unavailable(String),
    #[error("invalid location response: {0}")]
    InvalidResponse(String),
}

impl GeoError {
    /// Short label used as a metrics tag.
    pub fn outcome(&self) -> &'static str {
        match self {
            GeoError::Denied => "denied",
            GeoError::Timeout => "timeout",
            GeoError::Unavailable(_) => "unavailable",
            GeoError::InvalidResponse(_) => "invalid",
        }
    }
}

/// Source of device-reported coordinates for a scan.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceLocator: Send + Sync {
    async fn locate(&self, event: &ScanEvent) -> Result<DevicePosition, GeoError>;
}

/// Reverse geocoding of coordinates into a place name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Place, GeoError>;
}

/// IP address based geolocation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IpLocator: Send + Sync {
    async fn locate(&self, ip: IpAddr) -> Result<IpLocation, GeoError>;
}

/// Whether an address can be meaningfully geolocated.
///
/// Loopback, private, link-local and unspecified addresses never resolve, so
/// lookups for them are skipped.
pub fn is_routable(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.is_documentation())
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            !(v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80)
        }
    }
}
