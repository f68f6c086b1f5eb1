//! Hand-off of browser geolocation results to the scan worker.
//!
//! The redirect page asks the visitor's browser for its position and posts
//! the answer back. The scan for that visit is already queued by then, so
//! each page view registers a visit id here; the page posts against that id
//! and the scan worker waits on it for a bounded time.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use crate::domain::geo::{DevicePosition, GeoError};

/// What the browser reported for a visit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceReport {
    Position(DevicePosition),
    Denied,
    Timeout,
    Unavailable,
}

impl DeviceReport {
    fn into_result(self) -> Result<DevicePosition, GeoError> {
        match self {
            DeviceReport::Position(position) => Ok(position),
            DeviceReport::Denied => Err(GeoError::Denied),
            DeviceReport::Timeout => Err(GeoError::Timeout),
            DeviceReport::Unavailable => {
                Err(GeoError::Unavailable("device reported no position".to_string()))
            }
        }
    }
}

/// Why a report was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// Unknown visit, a visit of another QR code, or one no longer awaited.
    UnknownVisit,
    /// A report was already accepted for this visit.
    AlreadyReported,
}

struct Pending {
    tracking_token: String,
    sender: Option<oneshot::Sender<DeviceReport>>,
    receiver: Option<oneshot::Receiver<DeviceReport>>,
}

/// Pending device reports keyed by visit id.
///
/// An entry lives from the page view until the scan worker stops waiting
/// for it, so the table never holds more than the scan queue plus the
/// events in flight.
#[derive(Default)]
pub struct DeviceReports {
    pending: Mutex<HashMap<String, Pending>>,
}

impl DeviceReports {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Pending>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a slot for `visit_id` on the QR code behind `tracking_token`.
    pub fn register(&self, visit_id: &str, tracking_token: &str) {
        let (sender, receiver) = oneshot::channel();
        self.lock().insert(
            visit_id.to_string(),
            Pending {
                tracking_token: tracking_token.to_string(),
                sender: Some(sender),
                receiver: Some(receiver),
            },
        );
    }

    /// Drops the slot, e.g. when the scan event could not be queued.
    pub fn forget(&self, visit_id: &str) {
        self.lock().remove(visit_id);
    }

    /// Number of visits still awaiting a report or a waiter.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Accepts the browser's answer for a visit.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::UnknownVisit`] if the visit is not pending for
    /// `tracking_token`, [`DeliveryError::AlreadyReported`] on a second report.
    pub fn deliver(
        &self,
        visit_id: &str,
        tracking_token: &str,
        report: DeviceReport,
    ) -> Result<(), DeliveryError> {
        let mut pending = self.lock();
        let slot = pending
            .get_mut(visit_id)
            .filter(|slot| slot.tracking_token == tracking_token)
            .ok_or(DeliveryError::UnknownVisit)?;
        let sender = slot.sender.take().ok_or(DeliveryError::AlreadyReported)?;

        // A closed receiver means the waiter gave up between lookup and send.
        sender
            .send(report)
            .map_err(|_| DeliveryError::UnknownVisit)
    }

    /// Waits for the report of `visit_id`.
    ///
    /// Has no deadline of its own; callers bound it with a timeout. The slot
    /// is removed once the wait ends or the future is dropped.
    ///
    /// # Errors
    ///
    /// The [`GeoError`] matching the report, or [`GeoError::Denied`] if
    /// nothing is pending for the visit.
    pub async fn wait(&self, visit_id: &str) -> Result<DevicePosition, GeoError> {
        let receiver = self
            .lock()
            .get_mut(visit_id)
            .and_then(|slot| slot.receiver.take());
        let Some(receiver) = receiver else {
            return Err(GeoError::Denied);
        };

        let _slot = SlotGuard {
            reports: self,
            visit_id,
        };

        match receiver.await {
            Ok(report) => report.into_result(),
            Err(_) => Err(GeoError::Denied),
        }
    }
}

struct SlotGuard<'a> {
    reports: &'a DeviceReports,
    visit_id: &'a str,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.reports.forget(self.visit_id);
    }
}
