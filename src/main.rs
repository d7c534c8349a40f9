//! Bar Ingest - service entry point.

use tokio::net::TcpListener;
use tracing::{error, info};

use bar_ingest::database::{connect_store, BarRepository};
use bar_ingest::error::{AppError, Result};
use bar_ingest::logger::init_logger;
use bar_ingest::{api, BarSchema, Settings};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // The logger may not be up yet.
        eprintln!("bar_ingest: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let settings = Settings::load()?;
    init_logger(&settings)?;

    let project = settings.get_string("project.name").unwrap_or_else(|| "bars-backend".to_string());
    let (host, port) = listen_addr(&settings)?;

    info!("Application startup ({project} v{})", bar_ingest::VERSION);

    let store = connect_store(&settings).await?;
    let key = settings
        .get_string("database.key")
        .unwrap_or_else(|| bar_ingest::database::DEFAULT_BAR_KEY.to_string());
    let repository = BarRepository::new(store, key);
    let schema = BarSchema::from_settings(&settings);
    info!(
        key = repository.key(),
        strict = schema.is_strict(),
        "bar repository ready"
    );

    let app = api::router(api::AppState::new(repository, schema, project));

    let listener = TcpListener::bind((host.as_str(), port)).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Application shutdown");
    Ok(())
}

fn listen_addr(settings: &Settings) -> Result<(String, u16)> {
    let host = settings.get_string("app.host").unwrap_or_else(|| "0.0.0.0".to_string());
    let port = settings.get_int("app.port").unwrap_or(8000);
    let port = u16::try_from(port).map_err(|_| AppError::Config {
        key: "app.port".to_string(),
        reason: format!("{port} is not a valid port"),
    })?;
    Ok((host, port))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received");
}
