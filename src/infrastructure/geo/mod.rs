//! Geolocation adapters for the scan pipeline.
//!
//! - [`IpApiLocator`] - ipapi-compatible IP geolocation over HTTP
//! - [`NominatimGeocoder`] - Nominatim-compatible reverse geocoding over HTTP
//! - [`ReportedPositionLocator`] - coordinates the visitor's browser reported

pub mod ip_api;
pub mod nominatim;
pub mod reported;

pub use ip_api::IpApiLocator;
pub use nominatim::NominatimGeocoder;
pub use reported::{DEVICE_REPORT_GRACE, ReportedPositionLocator};

use std::time::Duration;

use crate::domain::geo::GeoError;

/// Builds the HTTP client shared by the lookup adapters.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn http_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
}

pub(crate) fn classify_error(e: &reqwest::Error) -> GeoError {
    if e.is_timeout() {
        GeoError::Timeout
    } else if e.is_decode() {
        GeoError::InvalidResponse(e.to_string())
    } else {
        GeoError::Unavailable(e.to_string())
    }
}
