//! Device locator backed by positions the visitor's browser reported.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::device_reports::DeviceReports;
use crate::domain::geo::{DeviceLocator, DevicePosition, GeoError};
use crate::domain::scan_event::ScanEvent;

/// Extra wait on top of the browser's geolocation timeout, covering the
/// upload of the report.
pub const DEVICE_REPORT_GRACE: Duration = Duration::from_secs(2);

/// Uses coordinates sent with the visit URL, otherwise waits for the report
/// the redirect page posts for the event's visit id.
///
/// The wait itself is unbounded; the scan recorder applies the deadline.
/// No coordinates and no visit id means the device cannot be asked.
#[derive(Clone)]
pub struct ReportedPositionLocator {
    reports: Arc<DeviceReports>,
}

impl ReportedPositionLocator {
    pub fn new(reports: Arc<DeviceReports>) -> Self {
        Self { reports }
    }
}

#[async_trait]
impl DeviceLocator for ReportedPositionLocator {
    async fn locate(&self, event: &ScanEvent) -> Result<DevicePosition, GeoError> {
        if let Some(position) = event.reported_position {
            return Ok(position);
        }

        match event.visit_id.as_deref() {
            Some(visit_id) => self.reports.wait(visit_id).await,
            None => Err(GeoError::Denied),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::device_reports::DeviceReport;
    use crate::domain::entities::UtmParams;

    fn locator() -> (ReportedPositionLocator, Arc<DeviceReports>) {
        let reports = Arc::new(DeviceReports::new());
        (ReportedPositionLocator::new(reports.clone()), reports)
    }

    #[tokio::test]
    async fn test_position_from_visit_url() {
        let (locator, _) = locator();
        let position = DevicePosition::new(47.0, 28.8, Some(10.0));
        let event = ScanEvent::new(1, None, None, UtmParams::default(), None).with_position(position);

        let located = locator.locate(&event).await.unwrap();
        assert_eq!(Some(located), position);
    }

    #[tokio::test]
    async fn test_position_from_browser_report() {
        let (locator, reports) = locator();
        let position = DevicePosition::new(47.0, 28.8, None).unwrap();
        reports.register("visit1", "tok1");
        reports
            .deliver("visit1", "tok1", DeviceReport::Position(position))
            .unwrap();
        let event = ScanEvent::new(1, None, None, UtmParams::default(), None).with_visit("visit1");

        assert_eq!(locator.locate(&event).await.unwrap(), position);
    }

    #[tokio::test]
    async fn test_browser_timeout_report() {
        let (locator, reports) = locator();
        reports.register("visit1", "tok1");
        reports
            .deliver("visit1", "tok1", DeviceReport::Timeout)
            .unwrap();
        let event = ScanEvent::new(1, None, None, UtmParams::default(), None).with_visit("visit1");

        let err = locator.locate(&event).await.unwrap_err();
        assert!(matches!(err, GeoError::Timeout));
    }

    #[tokio::test]
    async fn test_no_position_and_no_visit_is_denied() {
        let (locator, _) = locator();
        let event = ScanEvent::new(1, None, None, UtmParams::default(), None);

        let err = locator.locate(&event).await.unwrap_err();
        assert!(matches!(err, GeoError::Denied));
    }
}
