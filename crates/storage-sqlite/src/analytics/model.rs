//! Database models for analytics events.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use goalshare_core::analytics::AnalyticsEvent;

/// Database model for analytics events. Properties are stored as JSON text.
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::analytics_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AnalyticsEventDB {
    pub id: String,
    pub name: String,
    pub path: Option<String>,
    pub user_id: Option<String>,
    pub properties: Option<String>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<AnalyticsEventDB> for AnalyticsEvent {
    type Error = serde_json::Error;

    fn try_from(db: AnalyticsEventDB) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: db.id,
            name: db.name,
            path: db.path,
            user_id: db.user_id,
            properties: db
                .properties
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            created_at: db.created_at,
        })
    }
}
