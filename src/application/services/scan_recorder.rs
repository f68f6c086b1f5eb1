//! Best-effort scan telemetry: the scan row and its approximate location.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use tracing::{debug, warn};

use crate::domain::entities::NewScanLocation;
use crate::domain::geo::{DeviceLocator, GeoError, IpLocator, ReverseGeocoder, is_routable};
use crate::domain::repositories::ScanRepository;
use crate::domain::scan_event::ScanEvent;
use crate::domain::scan_worker::ScanProcessor;

/// Default bound on waiting for device coordinates.
pub const DEFAULT_DEVICE_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a resolved location came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    Device,
    Ip,
}

impl LocationSource {
    fn as_str(self) -> &'static str {
        match self {
            LocationSource::Device => "device",
            LocationSource::Ip => "ip",
        }
    }
}

/// A location obtained for a scan, before it is attached to a scan row.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub source: LocationSource,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl ResolvedLocation {
    fn into_new(self, scan_id: i64) -> NewScanLocation {
        NewScanLocation {
            scan_id,
            latitude: self.latitude,
            longitude: self.longitude,
            accuracy: self.accuracy,
            city: self.city,
            country: self.country,
        }
    }
}

/// What happened while recording one scan event.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    /// ID of the inserted scan row, `None` if the insert failed.
    pub scan_id: Option<i64>,
    pub location: Option<ResolvedLocation>,
    pub location_recorded: bool,
}

/// Records scans and attaches a location when one can be found.
///
/// # Pipeline
///
/// 1. Insert the scan row (failure is logged, later steps still run)
/// 2. Wait up to `device_timeout` for device coordinates, then enrich them
///    with a reverse-geocoded city and country (enrichment failure keeps the
///    bare coordinates)
/// 3. Without device coordinates, fall back to IP geolocation
/// 4. Insert the location if both a scan row and a location exist
///
/// Nothing is retried and no error escapes; every failure is logged and
/// counted.
pub struct ScanRecorder<S: ScanRepository + ?Sized> {
    scans: Arc<S>,
    device: Arc<dyn DeviceLocator>,
    geocoder: Arc<dyn ReverseGeocoder>,
    ip_locator: Arc<dyn IpLocator>,
    device_timeout: Duration,
}

impl<S: ScanRepository + ?Sized> ScanRecorder<S> {
    pub fn new(
        scans: Arc<S>,
        device: Arc<dyn DeviceLocator>,
        geocoder: Arc<dyn ReverseGeocoder>,
        ip_locator: Arc<dyn IpLocator>,
        device_timeout: Duration,
    ) -> Self {
        Self {
            scans,
            device,
            geocoder,
            ip_locator,
            device_timeout,
        }
    }

    /// Runs the full pipeline for one event.
    pub async fn record(&self, event: &ScanEvent) -> ScanOutcome {
        let scan_id = match self.scans.record_scan(event.to_new_scan()).await {
            Ok(scan) => {
                counter!("scans_recorded_total").increment(1);
                debug!(scan_id = scan.id, qr_code_id = event.qr_code_id, "Scan recorded");
                Some(scan.id)
            }
            Err(e) => {
                counter!("scans_failed_total").increment(1);
                warn!(qr_code_id = event.qr_code_id, "Failed to record scan: {}", e);
                None
            }
        };

        let location = self.locate(event).await;

        let mut location_recorded = false;
        if let (Some(scan_id), Some(found)) = (scan_id, location.as_ref()) {
            match self.scans.record_location(found.clone().into_new(scan_id)).await {
                Ok(_) => {
                    counter!("scan_locations_recorded_total").increment(1);
                    debug!(scan_id, source = found.source.as_str(), "Scan location recorded");
                    location_recorded = true;
                }
                Err(e) => {
                    counter!("scan_locations_failed_total").increment(1);
                    warn!(scan_id, "Failed to record scan location: {}", e);
                }
            }
        }

        ScanOutcome {
            scan_id,
            location,
            location_recorded,
        }
    }

    /// Device coordinates first, IP geolocation as the fallback.
    async fn locate(&self, event: &ScanEvent) -> Option<ResolvedLocation> {
        let device = match tokio::time::timeout(self.device_timeout, self.device.locate(event)).await
        {
            Ok(result) => result,
            Err(_) => Err(GeoError::Timeout),
        };

        match device {
            Ok(position) => {
                record_lookup("device", "ok");
                let place = match self
                    .geocoder
                    .reverse(position.latitude, position.longitude)
                    .await
                {
                    Ok(place) => {
                        record_lookup("reverse", "ok");
                        place
                    }
                    Err(e) => {
                        record_lookup("reverse", e.outcome());
                        debug!("Reverse geocoding failed: {}", e);
                        Default::default()
                    }
                };

                return Some(ResolvedLocation {
                    source: LocationSource::Device,
                    latitude: position.latitude,
                    longitude: position.longitude,
                    accuracy: position.accuracy,
                    city: place.city,
                    country: place.country,
                });
            }
            Err(e) => {
                record_lookup("device", e.outcome());
                debug!("Device location unavailable: {}", e);
            }
        }

        let Some(ip) = event.client_ip.filter(is_routable) else {
            record_lookup("ip", "skipped");
            return None;
        };

        match self.ip_locator.locate(ip).await {
            Ok(found) => {
                record_lookup("ip", "ok");
                Some(ResolvedLocation {
                    source: LocationSource::Ip,
                    latitude: found.latitude,
                    longitude: found.longitude,
                    accuracy: None,
                    city: found.city,
                    country: found.country,
                })
            }
            Err(e) => {
                record_lookup("ip", e.outcome());
                debug!("IP geolocation failed: {}", e);
                None
            }
        }
    }
}

fn record_lookup(source: &'static str, outcome: &'static str) {
    counter!("geo_lookups_total", "source" => source, "outcome" => outcome).increment(1);
}

#[async_trait]
impl<S: ScanRepository + ?Sized> ScanProcessor for ScanRecorder<S> {
    async fn process(&self, event: ScanEvent) {
        self.record(&event).await;
    }
}
