use goalshare_server::api::app_router;
use goalshare_server::config::Config;
use goalshare_server::{build_state, init_tracing, scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();
    let state = build_state(&config).await?;

    // Owned here so the retention task lives exactly as long as the server.
    let retention = scheduler::start_retention_scheduler(state.clone());

    let router = app_router(state, &config);
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    let served = axum::serve(listener, router).await;

    retention.abort();
    served?;
    Ok(())
}
