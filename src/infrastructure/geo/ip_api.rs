//! ipapi-compatible IP geolocation client.

use std::net::IpAddr;

use async_trait::async_trait;
use serde::Deserialize;
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use tracing::debug;

use super::classify_error;
use crate::domain::geo::{GeoError, IpLocation, IpLocator};

/// Response body of `GET {base}/{ip}/json/`.
///
/// Coordinates arrive as numbers from ipapi.co but as strings from some
/// compatible services, so both are accepted.
#[serde_as]
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    latitude: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    longitude: Option<f64>,
    city: Option<String>,
    country_name: Option<String>,
}

/// Looks up a coarse location for an IP address.
pub struct IpApiLocator {
    client: reqwest::Client,
    base_url: String,
}

impl IpApiLocator {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn lookup_url(&self, ip: IpAddr) -> String {
        format!("{}/{}/json/", self.base_url, ip)
    }
}

#[async_trait]
impl IpLocator for IpApiLocator {
    async fn locate(&self, ip: IpAddr) -> Result<IpLocation, GeoError> {
        let url = self.lookup_url(ip);
        debug!(%ip, "IP geolocation lookup");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| classify_error(&e))?;

        if !response.status().is_success() {
            return Err(GeoError::Unavailable(format!(
                "HTTP {}",
                response.status().as_u16()
            )));
        }

        let body: IpApiResponse = response.json().await.map_err(|e| classify_error(&e))?;
        parse_response(body)
    }
}

fn parse_response(body: IpApiResponse) -> Result<IpLocation, GeoError> {
    if body.error {
        return Err(GeoError::Unavailable(
            body.reason.unwrap_or_else(|| "lookup refused".to_string()),
        ));
    }

    match (body.latitude, body.longitude) {
        (Some(latitude), Some(longitude)) if latitude.is_finite() && longitude.is_finite() => {
            Ok(IpLocation {
                latitude,
                longitude,
                city: body.city.filter(|c| !c.is_empty()),
                country: body.country_name.filter(|c| !c.is_empty()),
            })
        }
        _ => Err(GeoError::InvalidResponse("missing coordinates".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<IpLocation, GeoError> {
        parse_response(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_parse_numeric_coordinates() {
        let location = parse(
            r#"{"ip":"8.8.8.8","city":"Chisinau","country_name":"Moldova","latitude":47.0056,"longitude":28.8575}"#,
        )
        .unwrap();

        assert_eq!(location.latitude, 47.0056);
        assert_eq!(location.longitude, 28.8575);
        assert_eq!(location.city.as_deref(), Some("Chisinau"));
        assert_eq!(location.country.as_deref(), Some("Moldova"));
    }

    #[test]
    fn test_parse_string_coordinates() {
        let location = parse(r#"{"latitude":"47.5","longitude":"28.25","city":""}"#).unwrap();

        assert_eq!(location.latitude, 47.5);
        assert_eq!(location.longitude, 28.25);
        assert!(location.city.is_none());
    }

    #[test]
    fn test_parse_error_body() {
        let err = parse(r#"{"error":true,"reason":"RateLimited"}"#).unwrap_err();
        assert!(matches!(err, GeoError::Unavailable(reason) if reason == "RateLimited"));
    }

    #[test]
    fn test_parse_missing_coordinates() {
        let err = parse(r#"{"city":"Chisinau"}"#).unwrap_err();
        assert!(matches!(err, GeoError::InvalidResponse(_)));
    }

    #[test]
    fn test_lookup_url() {
        let locator = IpApiLocator::new(reqwest::Client::new(), "https://ipapi.co/");
        assert_eq!(
            locator.lookup_url("8.8.8.8".parse().unwrap()),
            "https://ipapi.co/8.8.8.8/json/"
        );
    }
}
