use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use goalshare_core::{
    analytics::{AnalyticsService, AnalyticsServiceTrait},
    auth::{AuthService, AuthServiceTrait, LoginCodeSenderTrait},
    goals::{GoalService, GoalServiceTrait},
    users::{UserService, UserServiceTrait},
};
use goalshare_storage_sqlite::{
    db, AnalyticsRepository, GoalRepository, LoginCodeRepository, UserRepository,
};

use crate::auth::{decode_secret_key, AuthManager, LogCodeSender};
use crate::config::Config;

pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub goal_service: Arc<dyn GoalServiceTrait>,
    pub auth_service: Arc<dyn AuthServiceTrait>,
    pub analytics_service: Arc<dyn AnalyticsServiceTrait>,
    pub auth: Arc<AuthManager>,
    pub analytics_retention_days: u32,
    pub retention_interval: Duration,
}

pub fn init_tracing() {
    let log_format = std::env::var("GS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    build_state_with_sender(config, Arc::new(LogCodeSender)).await
}

/// Wires repositories and services. `code_sender` delivers login codes.
pub async fn build_state_with_sender(
    config: &Config,
    code_sender: Arc<dyn LoginCodeSenderTrait>,
) -> anyhow::Result<Arc<AppState>> {
    let secret = decode_secret_key(&config.secret_key)?;

    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let user_repo = Arc::new(UserRepository::new(pool.clone(), writer.clone()));
    let user_service: Arc<dyn UserServiceTrait> = Arc::new(UserService::new(user_repo));

    let goal_repo = Arc::new(GoalRepository::new(pool.clone(), writer.clone()));
    let goal_service: Arc<dyn GoalServiceTrait> =
        Arc::new(GoalService::new(goal_repo, user_service.clone()));

    let code_repo = Arc::new(LoginCodeRepository::new(pool.clone(), writer.clone()));
    let auth_service: Arc<dyn AuthServiceTrait> = Arc::new(AuthService::new(
        code_repo,
        code_sender,
        user_service.clone(),
    ));

    let analytics_repo = Arc::new(AnalyticsRepository::new(writer.clone()));
    let analytics_service: Arc<dyn AnalyticsServiceTrait> =
        Arc::new(AnalyticsService::new(analytics_repo));

    let auth = Arc::new(AuthManager::new(
        &secret,
        config.session_ttl,
        config.cookie_secure,
    ));

    Ok(Arc::new(AppState {
        user_service,
        goal_service,
        auth_service,
        analytics_service,
        auth,
        analytics_retention_days: config.analytics_retention_days,
        retention_interval: config.retention_interval,
    }))
}
