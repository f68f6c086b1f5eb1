//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod audit_logs;
pub mod health;
pub mod qr_codes;
pub mod redirect;
pub mod stats;
pub mod workers;

pub use audit_logs::audit_log_list_handler;
pub use health::health_handler;
pub use qr_codes::{
    create_qr_code_handler, delete_qr_code_handler, get_qr_code_handler, qr_code_list_handler,
};
pub use redirect::{device_location_handler, redirect_handler};
pub use stats::{
    overview_handler, scan_history_handler, username_summary_handler, worker_activity_handler,
};
pub use workers::{
    create_worker_handler, delete_worker_handler, get_worker_handler, worker_list_handler,
};
