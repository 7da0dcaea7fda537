//! SQLite storage implementation for analytics events.

mod model;
mod repository;

pub use model::AnalyticsEventDB;
pub use repository::AnalyticsRepository;
