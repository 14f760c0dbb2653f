use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trailgeo::{AppState, config::AppConfig, create_router};

const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trailgeo=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        "config: precision={}, speed={} km/h, {} regions, {} categories",
        config.geohash_precision,
        config.speed_kmh,
        config.regions.regions.len(),
        config.categories.entries.len()
    );

    let state = AppState {
        config: Arc::new(config),
    };
    let app = create_router(state);

    let addr: SocketAddr = std::env::var("TRAILGEO_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;
    tracing::info!("starting trailgeo on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
