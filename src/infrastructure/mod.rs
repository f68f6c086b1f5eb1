//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching and geolocation.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis and no-op implementations)
//! - [`geo`] - HTTP geolocation lookups and the reported-position locator
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod geo;
pub mod persistence;
