//! DTOs for statistics endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::application::services::stats_service::{Overview, ScanHistory};
use crate::domain::entities::{ScanDetails, ScanLocation};
use crate::domain::stats::{DayBucket, TimeRange, UsernameSummary, WorkerActivity};

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub workers: i64,
    pub qr_codes: i64,
    pub scans: i64,
}

impl From<Overview> for OverviewResponse {
    fn from(o: Overview) -> Self {
        OverviewResponse {
            workers: o.workers,
            qr_codes: o.qr_codes,
            scans: o.scans,
        }
    }
}

/// `?range=week|month|year&utc_offset_minutes=...`
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ScanHistoryParams {
    #[serde(default)]
    pub range: TimeRange,

    /// Caller's offset from UTC used to assign scans to calendar days.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct LocationItem {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub display_name: String,
    pub maps_url: String,
}

impl From<ScanLocation> for LocationItem {
    fn from(l: ScanLocation) -> Self {
        LocationItem {
            display_name: l.display_name(),
            maps_url: l.maps_url(),
            latitude: l.latitude,
            longitude: l.longitude,
            accuracy: l.accuracy,
            city: l.city,
            country: l.country,
        }
    }
}

/// One row of the recent scans table.
#[derive(Debug, Serialize)]
pub struct ScanItem {
    pub id: i64,
    pub qr_code_id: i64,
    pub scanned_at: DateTime<Utc>,
    pub purpose: Option<String>,
    pub worker_name: Option<String>,
    pub device: Option<String>,
    pub referrer_host: Option<String>,
    pub location: Option<LocationItem>,
}

impl From<ScanDetails> for ScanItem {
    fn from(s: ScanDetails) -> Self {
        ScanItem {
            device: s.device(),
            referrer_host: s.referrer_host(),
            id: s.id,
            qr_code_id: s.qr_code_id,
            scanned_at: s.scanned_at,
            purpose: s.purpose,
            worker_name: s.worker_name,
            location: s.location.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScanHistoryResponse {
    pub range: TimeRange,
    pub since: DateTime<Utc>,
    pub total_scans: i64,
    pub scans_in_range: usize,
    pub buckets: Vec<DayBucket>,
    pub recent: Vec<ScanItem>,
}

impl From<ScanHistory> for ScanHistoryResponse {
    fn from(h: ScanHistory) -> Self {
        ScanHistoryResponse {
            range: h.range,
            since: h.since,
            total_scans: h.total_scans,
            scans_in_range: h.recent.len(),
            buckets: h.buckets,
            recent: h.recent.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkerActivityResponse {
    pub items: Vec<WorkerActivity>,
}

/// `?q=...`
#[derive(Debug, Default, Deserialize)]
pub struct UsernameParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UsernameSummaryResponse {
    pub items: Vec<UsernameSummary>,
}
