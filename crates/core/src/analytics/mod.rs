//! Analytics module - first-party page and event tracking with retention.

mod analytics_model;
mod analytics_service;
mod analytics_traits;

pub use analytics_model::{AnalyticsEvent, NewAnalyticsEvent};
pub use analytics_service::AnalyticsService;
pub use analytics_traits::{AnalyticsRepositoryTrait, AnalyticsServiceTrait};
