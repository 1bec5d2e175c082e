use dotenvy::dotenv;
use sams::config::server::ServerConfig;
use sams::logging::{init_tracing, shutdown_tracer};
use sams::metrics::init_metrics;
use sams::router::init_router;
use sams::state::init_app_state;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing()?;

    let metrics = init_metrics()?;
    let state = init_app_state().await?;
    let app = init_router(state, metrics);

    let config = ServerConfig::from_env();
    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    info!(addr = %config.addr, "SAMS listening");
    info!("Swagger UI at /swagger-ui, Scalar at /scalar");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tracer().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
