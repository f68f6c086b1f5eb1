//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures. Creation inputs use separate `New*`
//! structs (`NewWorker`, `NewQrCode`, `NewScan`, `NewScanLocation`,
//! `NewAuditLog`) because identifiers and timestamps are assigned by the
//! database.
//!
//! # Entity Types
//!
//! - [`Worker`] - An agent that QR codes are attributed to
//! - [`QrCode`] - A trackable QR code with its destination
//! - [`Scan`] - A single visit through a tracking token
//! - [`ScanLocation`] - Optional approximate location of a scan
//! - [`AuditLog`] - Record of an administrative action

pub mod audit_log;
pub mod qr_code;
pub mod scan;
pub mod scan_location;
pub mod worker;

pub use audit_log::{AuditLog, NewAuditLog};
pub use qr_code::{ErrorCorrectionLevel, NewQrCode, QrCode, QrCustomization};
pub use scan::{NewScan, Scan, ScanDetails, UtmParams};
pub use scan_location::{NewScanLocation, ScanLocation};
pub use worker::{NewWorker, Worker};
