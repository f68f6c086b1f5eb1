//! Utility functions shared across the application.
//!
//! - [`code_generator`] - Worker code and tracking token generation
//! - [`url_validator`] - Target URL and color validation
//! - [`client_ip`] - Visitor IP resolution from HTTP requests

pub mod client_ip;
pub mod code_generator;
pub mod url_validator;
