use std::sync::Arc;
use std::time::Duration;

use cab_compass::api;
use cab_compass::config::{Config, LogFormat};
use cab_compass::error::AppError;
use cab_compass::geo::{Geocoder, GoogleGeocoder};
use cab_compass::state::AppState;
use cab_compass::store::{MemoryStore, MongoStore, Store};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;
    init_tracing(&config);

    let store: Arc<dyn Store> = match config.mongo_url.as_deref() {
        Some(url) => Arc::new(
            MongoStore::connect(url, config.mongo_database.as_deref())
                .await
                .map_err(|err| AppError::Internal(format!("mongodb connection failed: {err}")))?,
        ),
        None => {
            tracing::warn!("MONGO_URL not set, records are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    if let Err(err) = store.ping().await {
        tracing::error!(error = %err, store = store.backend(), "store is not reachable");
    }

    if config.google_api_key.is_none() {
        tracing::warn!("GOOGLE_API_KEY not set, employee writes will fail geocoding");
    }

    let geocoder: Arc<dyn Geocoder> = Arc::new(
        GoogleGeocoder::new(
            config.geocode_url.clone(),
            config.google_api_key.clone(),
            Duration::from_secs(config.geocode_timeout_secs),
        )
        .map_err(|err| AppError::Internal(format!("failed to build geocoding client: {err}")))?,
    );

    let app = api::rest::router(Arc::new(AppState::new(store, geocoder)));

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(port = config.port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

fn init_tracing(config: &Config) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false);

    match config.log_format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
