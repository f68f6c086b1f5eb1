//! Query parameters of the redirect page and the location report it posts.

use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::domain::device_reports::DeviceReport;
use crate::domain::entities::UtmParams;
use crate::domain::geo::DevicePosition;
use crate::error::AppError;

/// `GET /r/{token}?utm_source=&utm_medium=&utm_campaign=&lat=&lon=&acc=`
///
/// Coordinates are parsed leniently: a malformed value is treated as absent
/// so a visitor is never refused a redirect because of telemetry.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectParams {
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub acc: Option<String>,
}

impl RedirectParams {
    pub fn utm(&self) -> UtmParams {
        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        UtmParams {
            source: non_empty(&self.utm_source),
            medium: non_empty(&self.utm_medium),
            campaign: non_empty(&self.utm_campaign),
        }
    }

    /// Device-reported position, when both coordinates parse and are in range.
    pub fn position(&self) -> Option<DevicePosition> {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<f64>().ok());

        DevicePosition::new(parse(&self.lat)?, parse(&self.lon)?, parse(&self.acc))
    }
}

/// Why the browser produced no position, as the Geolocation API reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceLocationFailure {
    Denied,
    Timeout,
    Unavailable,
}

/// `POST /r/{token}/location`
///
/// Either `latitude` and `longitude` (plus optional `accuracy`), or an
/// `error`. A body with neither counts as denied.
#[derive(Debug, Deserialize, Validate)]
pub struct DeviceLocationRequest {
    pub visit_id: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(range(min = 0.0))]
    pub accuracy: Option<f64>,
    pub error: Option<DeviceLocationFailure>,
}

impl DeviceLocationRequest {
    /// The report to hand to the scan worker.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when only one coordinate is present.
    pub fn report(&self) -> Result<DeviceReport, AppError> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => {
                DevicePosition::new(latitude, longitude, self.accuracy)
                    .map(DeviceReport::Position)
                    .ok_or_else(|| {
                        AppError::bad_request(
                            "Coordinates out of range",
                            json!({ "latitude": latitude, "longitude": longitude }),
                        )
                    })
            }
            (None, None) => Ok(match self.error {
                Some(DeviceLocationFailure::Timeout) => DeviceReport::Timeout,
                Some(DeviceLocationFailure::Unavailable) => DeviceReport::Unavailable,
                Some(DeviceLocationFailure::Denied) | None => DeviceReport::Denied,
            }),
            _ => Err(AppError::bad_request(
                "Both latitude and longitude are required",
                json!({ "field": if self.latitude.is_none() { "latitude" } else { "longitude" } }),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(json: &str) -> RedirectParams {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_utm_blank_values_are_absent() {
        let utm = params(r#"{"utm_source":"flyer","utm_medium":"  "}"#).utm();
        assert_eq!(utm.source.as_deref(), Some("flyer"));
        assert!(utm.medium.is_none());
        assert!(utm.campaign.is_none());
    }

    #[test]
    fn test_position_parsed() {
        let position = params(r#"{"lat":"47.01","lon":"28.86","acc":"12.5"}"#)
            .position()
            .unwrap();
        assert_eq!(position.latitude, 47.01);
        assert_eq!(position.longitude, 28.86);
        assert_eq!(position.accuracy, Some(12.5));
    }

    #[test]
    fn test_position_requires_both_coordinates() {
        assert!(params(r#"{"lat":"47.01"}"#).position().is_none());
        assert!(params(r#"{"lat":"abc","lon":"28.86"}"#).position().is_none());
        assert!(params(r#"{"lat":"95","lon":"28.86"}"#).position().is_none());
    }

    #[test]
    fn test_bad_accuracy_keeps_position() {
        let position = params(r#"{"lat":"47","lon":"28","acc":"wide"}"#)
            .position()
            .unwrap();
        assert!(position.accuracy.is_none());
    }

    fn location(json: &str) -> DeviceLocationRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_location_report_position() {
        let request = location(r#"{"visit_id":"v","latitude":47.01,"longitude":28.86,"accuracy":14.0}"#);
        assert!(request.validate().is_ok());

        let report = request.report().unwrap();
        assert_eq!(
            report,
            DeviceReport::Position(DevicePosition::new(47.01, 28.86, Some(14.0)).unwrap())
        );
    }

    #[test]
    fn test_location_report_failures() {
        assert_eq!(
            location(r#"{"visit_id":"v","error":"timeout"}"#).report().unwrap(),
            DeviceReport::Timeout
        );
        assert_eq!(
            location(r#"{"visit_id":"v","error":"unavailable"}"#).report().unwrap(),
            DeviceReport::Unavailable
        );
        assert_eq!(
            location(r#"{"visit_id":"v"}"#).report().unwrap(),
            DeviceReport::Denied
        );
    }

    #[test]
    fn test_location_report_rejects_partial_or_out_of_range() {
        assert!(location(r#"{"visit_id":"v","latitude":47.0}"#).report().is_err());
        assert!(
            location(r#"{"visit_id":"v","latitude":95.0,"longitude":10.0}"#)
                .validate()
                .is_err()
        );
    }
}
