//! Scan event model for asynchronous scan logging.

use std::net::IpAddr;

use crate::domain::entities::{NewScan, UtmParams};
use crate::domain::geo::DevicePosition;

/// An in-memory representation of a scan for background processing.
///
/// The redirect handler resolves the tracking token, builds one event per
/// visit and pushes it into a bounded channel. The scan worker turns it into
/// a `qr_scans` row and, when possible, a `scan_locations` row.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanEvent {
    pub qr_code_id: i64,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub utm: UtmParams,
    pub client_ip: Option<IpAddr>,
    /// Coordinates the device reported alongside the visit, if any.
    pub reported_position: Option<DevicePosition>,
    /// Visit id the redirect page posts the browser position against.
    pub visit_id: Option<String>,
}

impl ScanEvent {
    /// Creates a new scan event.
    ///
    /// Empty header values are treated as absent.
    pub fn new(
        qr_code_id: i64,
        user_agent: Option<&str>,
        referrer: Option<&str>,
        utm: UtmParams,
        client_ip: Option<IpAddr>,
    ) -> Self {
        let non_empty = |s: Option<&str>| {
            s.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            qr_code_id,
            user_agent: non_empty(user_agent),
            referrer: non_empty(referrer),
            utm,
            client_ip,
            reported_position: None,
            visit_id: None,
        }
    }

    pub fn with_position(mut self, position: Option<DevicePosition>) -> Self {
        self.reported_position = position;
        self
    }

    pub fn with_visit(mut self, visit_id: impl Into<String>) -> Self {
        self.visit_id = Some(visit_id.into());
        self
    }

    /// Scan row to insert for this event.
    pub fn to_new_scan(&self) -> NewScan {
        NewScan {
            qr_code_id: self.qr_code_id,
            user_agent: self.user_agent.clone(),
            referrer: self.referrer.clone(),
            utm: self.utm.clone(),
        }
    }
}
