//! Background retention task.
//!
//! Periodically deletes analytics events past their retention window and
//! login codes that expired or were used.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;

/// Initial delay before the first run (let the server finish starting)
const INITIAL_DELAY_SECS: u64 = 60;

/// Starts the retention task. The caller owns the returned handle.
pub fn start_retention_scheduler(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Retention scheduler started ({}s interval, {} day analytics retention)",
            state.retention_interval.as_secs(),
            state.analytics_retention_days
        );

        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        // First tick is immediate, later ticks follow the configured interval.
        let mut ticker = interval(state.retention_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            run_retention(&state).await;
        }
    })
}

/// Runs one retention pass. Failures are logged and retried on the next tick.
pub async fn run_retention(state: &AppState) -> (usize, usize) {
    let now = Utc::now().naive_utc();

    let events = match state
        .analytics_service
        .purge_expired_events(now, state.analytics_retention_days)
        .await
    {
        Ok(count) => count,
        Err(e) => {
            warn!("Analytics retention failed: {}", e);
            0
        }
    };

    let codes = match state.auth_service.purge_expired_codes(now).await {
        Ok(count) => count,
        Err(e) => {
            warn!("Login code cleanup failed: {}", e);
            0
        }
    };

    if events > 0 || codes > 0 {
        info!(
            "Retention removed {} analytics events and {} login codes",
            events, codes
        );
    } else {
        debug!("Retention pass found nothing to remove");
    }
    (events, codes)
}
