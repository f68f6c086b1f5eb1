//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`geo`] - Geolocation contracts and value types
//! - [`destination`] - Final redirect destination rules
//! - [`stats`] - Pure statistics aggregation
//! - [`listing`] - Search and sort options for list endpoints
//! - [`scan_event`] - Scan event model
//! - [`scan_worker`] - Asynchronous scan processing worker
//! - [`device_reports`] - Browser geolocation results awaiting their scan
//!
//! # Scan Processing Flow
//!
//! 1. Redirect handler resolves the tracking token
//! 2. [`scan_event::ScanEvent`] is sent to a bounded channel and a visit id
//!    is registered in [`device_reports::DeviceReports`]
//! 3. [`scan_worker::run_scan_worker`] hands events to a
//!    [`scan_worker::ScanProcessor`] with bounded concurrency
//! 4. The processor waits briefly for the browser's position report
//! 5. The scan and its optional location are persisted via
//!    [`repositories::ScanRepository`]

pub mod destination;
pub mod device_reports;
pub mod entities;
pub mod geo;
pub mod listing;
pub mod repositories;
pub mod scan_event;
pub mod scan_worker;
pub mod stats;
