use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use goalshare_core::analytics::NewAnalyticsEvent;

use crate::{error::ApiResult, main_lib::AppState};

/// Records a client event. Anonymous events are accepted; a valid session
/// attributes the event to its user, an invalid one is ignored.
async fn record_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(event): Json<NewAnalyticsEvent>,
) -> ApiResult<StatusCode> {
    let user_id = state.auth.user_id_from_headers(&headers).ok().flatten();
    state
        .analytics_service
        .record_event(user_id.as_deref(), event)
        .await?;
    Ok(StatusCode::ACCEPTED)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/analytics/events", post(record_event))
}
