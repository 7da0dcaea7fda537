use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use log::debug;

use super::analytics_model::{AnalyticsEvent, NewAnalyticsEvent};
use super::analytics_traits::{AnalyticsRepositoryTrait, AnalyticsServiceTrait};
use crate::constants::{MAX_EVENT_NAME_LEN, MAX_EVENT_PATH_LEN};
use crate::errors::{Error, Result, ValidationError};

pub struct AnalyticsService {
    repository: Arc<dyn AnalyticsRepositoryTrait>,
}

impl AnalyticsService {
    pub fn new(repository: Arc<dyn AnalyticsRepositoryTrait>) -> Self {
        AnalyticsService { repository }
    }
}

fn invalid(message: String) -> Error {
    Error::Validation(ValidationError::InvalidInput(message))
}

/// Trims the event and checks its limits. Empty paths are dropped.
fn validate_event(event: NewAnalyticsEvent) -> Result<NewAnalyticsEvent> {
    let name = event.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            "name".to_string(),
        )));
    }
    if name.chars().count() > MAX_EVENT_NAME_LEN {
        return Err(invalid(format!(
            "Event name must be at most {} characters",
            MAX_EVENT_NAME_LEN
        )));
    }

    let path = event
        .path
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());
    if let Some(p) = &path {
        if p.chars().count() > MAX_EVENT_PATH_LEN {
            return Err(invalid(format!(
                "Event path must be at most {} characters",
                MAX_EVENT_PATH_LEN
            )));
        }
    }

    if let Some(props) = &event.properties {
        if !props.is_object() && !props.is_null() {
            return Err(invalid("Event properties must be a JSON object".to_string()));
        }
    }
    let properties = event.properties.filter(|p| !p.is_null());

    Ok(NewAnalyticsEvent {
        name,
        path,
        properties,
    })
}

#[async_trait]
impl AnalyticsServiceTrait for AnalyticsService {
    async fn record_event(
        &self,
        user_id: Option<&str>,
        event: NewAnalyticsEvent,
    ) -> Result<AnalyticsEvent> {
        let event = validate_event(event)?;
        self.repository
            .insert_event(user_id.map(str::to_string), event)
            .await
    }

    async fn purge_expired_events(
        &self,
        now: NaiveDateTime,
        retention_days: u32,
    ) -> Result<usize> {
        let cutoff = now - Duration::days(i64::from(retention_days));
        let deleted = self.repository.delete_events_before(cutoff).await?;
        debug!("Purged {} analytics events older than {}", deleted, cutoff);
        Ok(deleted)
    }
}
