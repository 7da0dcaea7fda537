use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A recorded client event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub id: String,
    pub name: String,
    pub path: Option<String>,
    pub user_id: Option<String>,
    pub properties: Option<Value>,
    pub created_at: NaiveDateTime,
}

/// Event payload as sent by clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnalyticsEvent {
    pub name: String,
    pub path: Option<String>,
    pub properties: Option<Value>,
}
