//! Goalshare Core - Domain entities, services, and traits.
//!
//! This crate contains the business logic for tracking shared savings goals,
//! including the contribution planner. It is database-agnostic and defines
//! traits that are implemented by the `storage-sqlite` crate.

pub mod analytics;
pub mod auth;
pub mod constants;
pub mod errors;
pub mod goals;
pub mod planning;
pub mod users;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
