//! Approximate location attached to a scan.

/// Location recorded for a scan, from the device or from the client IP.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanLocation {
    pub scan_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in metres. Only device positions carry one.
    pub accuracy: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl ScanLocation {
    /// `city, country` when both are known, otherwise `lat, lon` to 4 decimals.
    pub fn display_name(&self) -> String {
        match (&self.city, &self.country) {
            (Some(city), Some(country)) => format!("{}, {}", city, country),
            _ => format!("{:.4}, {:.4}", self.latitude, self.longitude),
        }
    }

    /// Google Maps link for the coordinates.
    pub fn maps_url(&self) -> String {
        format!(
            "https://www.google.com/maps?q={},{}",
            self.latitude, self.longitude
        )
    }
}

/// Input data for attaching a location to a scan.
///
/// The database allows at most one location per scan.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScanLocation {
    pub scan_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(city: Option<&str>, country: Option<&str>) -> ScanLocation {
        ScanLocation {
            scan_id: 1,
            latitude: 47.010_452,
            longitude: 28.863_810,
            accuracy: None,
            city: city.map(str::to_string),
            country: country.map(str::to_string),
        }
    }

    #[test]
    fn test_display_name_with_place() {
        assert_eq!(
            location(Some("Chisinau"), Some("Moldova")).display_name(),
            "Chisinau, Moldova"
        );
    }

    #[test]
    fn test_display_name_falls_back_to_coordinates() {
        assert_eq!(location(Some("Chisinau"), None).display_name(), "47.0105, 28.8638");
        assert_eq!(location(None, None).display_name(), "47.0105, 28.8638");
    }

    #[test]
    fn test_maps_url() {
        assert_eq!(
            location(None, None).maps_url(),
            "https://www.google.com/maps?q=47.010452,28.86381"
        );
    }
}
