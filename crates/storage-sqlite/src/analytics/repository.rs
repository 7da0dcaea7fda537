use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use uuid::Uuid;

use goalshare_core::analytics::{AnalyticsEvent, AnalyticsRepositoryTrait, NewAnalyticsEvent};
use goalshare_core::Result;

use super::model::AnalyticsEventDB;
use crate::db::WriteHandle;
use crate::errors::{IntoCore, StorageError};
use crate::schema::analytics_events;

/// Analytics storage. Events are write-only from the application's view, so
/// only the writer is needed.
pub struct AnalyticsRepository {
    writer: WriteHandle,
}

impl AnalyticsRepository {
    pub fn new(writer: WriteHandle) -> Self {
        AnalyticsRepository { writer }
    }
}

#[async_trait]
impl AnalyticsRepositoryTrait for AnalyticsRepository {
    async fn insert_event(
        &self,
        user_id: Option<String>,
        event: NewAnalyticsEvent,
    ) -> Result<AnalyticsEvent> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<AnalyticsEvent> {
                let properties = event
                    .properties
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()
                    .map_err(StorageError::from)?;
                let row = AnalyticsEventDB {
                    // v7 ids sort by creation time
                    id: Uuid::now_v7().to_string(),
                    name: event.name,
                    path: event.path,
                    user_id,
                    properties,
                    created_at: Utc::now().naive_utc(),
                };
                diesel::insert_into(analytics_events::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                AnalyticsEvent::try_from(row).map_err(|e| StorageError::from(e).into())
            })
            .await
    }

    async fn delete_events_before(&self, cutoff: NaiveDateTime) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(
                    analytics_events::table.filter(analytics_events::created_at.lt(cutoff)),
                )
                .execute(conn)
                .into_core()
            })
            .await
    }
}
