use anyhow::Result;
use sourcegate::{
    api, app_state::AppState, build_pipeline, config::Config, init_tracing,
    middleware::rate_limit::RateLimit,
};
use std::{net::SocketAddr, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let pipeline = Arc::new(build_pipeline(&config)?);
    let rate_limit = RateLimit::new(config.rate_limit_max_requests(), config.rate_limit_window());

    let shutdown = CancellationToken::new();
    let pruner = rate_limit.spawn_pruner(shutdown.clone());
    let app = api::router(AppState::new(pipeline), rate_limit);

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received");
            }
            shutdown.cancel();
        }
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %listener.local_addr()?, "sourcegate API listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown.clone().cancelled_owned())
    .await?;

    shutdown.cancel();
    pruner.await?;
    info!("sourcegate API stopped");
    Ok(())
}
