//! Nominatim-compatible reverse geocoding client.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::classify_error;
use crate::domain::geo::{GeoError, Place, ReverseGeocoder};

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<Address>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    country: Option<String>,
}

/// Resolves coordinates to a city and country.
///
/// Nominatim's usage policy requires an identifying User-Agent, which is set
/// on the shared client.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Place, GeoError> {
        let url = format!("{}/reverse", self.base_url);
        debug!(latitude, longitude, "Reverse geocoding lookup");

        let lat = latitude.to_string();
        let lon = longitude.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("lat", lat.as_str()), ("lon", lon.as_str())])
            .send()
            .await
            .map_err(|e| classify_error(&e))?;

        if !response.status().is_success() {
            return Err(GeoError::Unavailable(format!(
                "HTTP {}",
                response.status().as_u16()
            )));
        }

        let body: ReverseResponse = response.json().await.map_err(|e| classify_error(&e))?;
        parse_response(body)
    }
}

/// City falls back to town, then village. A response without an address
/// yields an empty [`Place`].
fn parse_response(body: ReverseResponse) -> Result<Place, GeoError> {
    if let Some(error) = body.error {
        return Err(GeoError::InvalidResponse(error));
    }

    let Some(address) = body.address else {
        return Ok(Place::default());
    };

    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
    Ok(Place {
        city: non_empty(address.city)
            .or_else(|| non_empty(address.town))
            .or_else(|| non_empty(address.village)),
        country: non_empty(address.country),
    })
}
