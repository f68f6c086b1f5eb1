//! Scan entity: one recorded visit through a tracking token.

use chrono::{DateTime, Utc};

use super::ScanLocation;

/// UTM campaign parameters captured from the redirect URL query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtmParams {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
}

/// A recorded scan of a QR code.
#[derive(Debug, Clone)]
pub struct Scan {
    pub id: i64,
    pub qr_code_id: i64,
    pub scanned_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub utm: UtmParams,
}

/// Input data for recording a scan. `scanned_at` is set by the database.
#[derive(Debug, Clone)]
pub struct NewScan {
    pub qr_code_id: i64,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub utm: UtmParams,
}

/// A scan joined with its QR code, worker and optional location.
///
/// Read model for statistics listings.
#[derive(Debug, Clone)]
pub struct ScanDetails {
    pub id: i64,
    pub qr_code_id: i64,
    pub scanned_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub purpose: Option<String>,
    pub worker_name: Option<String>,
    pub location: Option<ScanLocation>,
}

impl ScanDetails {
    /// Short device label: the user agent up to and including its first `)`.
    ///
    /// `Mozilla/5.0 (iPhone; CPU iPhone OS 17_0) AppleWebKit/...` becomes
    /// `Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)`.
    pub fn device(&self) -> Option<String> {
        let ua = self.user_agent.as_deref().filter(|ua| !ua.is_empty())?;
        Some(match ua.find(')') {
            Some(end) => ua[..=end].to_string(),
            None => ua.to_string(),
        })
    }

    /// Host name of the referrer, if it parses as a URL.
    pub fn referrer_host(&self) -> Option<String> {
        let referrer = self.referrer.as_deref()?;
        url::Url::parse(referrer)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(user_agent: Option<&str>, referrer: Option<&str>) -> ScanDetails {
        ScanDetails {
            id: 1,
            qr_code_id: 2,
            scanned_at: Utc::now(),
            user_agent: user_agent.map(str::to_string),
            referrer: referrer.map(str::to_string),
            purpose: None,
            worker_name: None,
            location: None,
        }
    }

    #[test]
    fn test_device_truncates_after_first_paren() {
        let d = details(
            Some("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15"),
            None,
        );
        assert_eq!(
            d.device().unwrap(),
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)"
        );
    }

    #[test]
    fn test_device_without_paren_is_whole_agent() {
        assert_eq!(details(Some("curl/8.0"), None).device().unwrap(), "curl/8.0");
    }

    #[test]
    fn test_device_missing() {
        assert!(details(None, None).device().is_none());
        assert!(details(Some(""), None).device().is_none());
    }

    #[test]
    fn test_referrer_host() {
        let d = details(None, Some("https://www.facebook.com/some/post"));
        assert_eq!(d.referrer_host().unwrap(), "www.facebook.com");
    }

    #[test]
    fn test_referrer_host_invalid() {
        assert!(details(None, Some("not a url")).referrer_host().is_none());
        assert!(details(None, None).referrer_host().is_none());
    }
}
