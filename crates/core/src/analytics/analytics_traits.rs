use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::analytics_model::{AnalyticsEvent, NewAnalyticsEvent};
use crate::errors::Result;

/// Trait for analytics event storage
#[async_trait]
pub trait AnalyticsRepositoryTrait: Send + Sync {
    async fn insert_event(
        &self,
        user_id: Option<String>,
        event: NewAnalyticsEvent,
    ) -> Result<AnalyticsEvent>;
    /// Deletes events created strictly before `cutoff`.
    async fn delete_events_before(&self, cutoff: NaiveDateTime) -> Result<usize>;
}

/// Trait for analytics service operations
#[async_trait]
pub trait AnalyticsServiceTrait: Send + Sync {
    async fn record_event(
        &self,
        user_id: Option<&str>,
        event: NewAnalyticsEvent,
    ) -> Result<AnalyticsEvent>;
    async fn purge_expired_events(&self, now: NaiveDateTime, retention_days: u32)
        -> Result<usize>;
}
