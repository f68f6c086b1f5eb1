//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation.

pub mod audit_logs;
pub mod health;
pub mod list;
pub mod qr_codes;
pub mod redirect;
pub mod stats;
pub mod workers;
