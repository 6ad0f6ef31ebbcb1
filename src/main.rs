use tracing_subscriber::EnvFilter;

use courier_quote_engine::api::{AppState, create_router};
use courier_quote_engine::config::{ConfigLoader, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(settings.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let loader = ConfigLoader::load(&settings.config_dir)?;
    let state = AppState::new(loader.into_catalog());
    let app = create_router(state);

    let bind_addr = format!("0.0.0.0:{}", settings.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!(
        http_port = settings.http_port,
        config_dir = %settings.config_dir.display(),
        "http server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
