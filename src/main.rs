//! Neela Fashion storefront - catalog, shipping and checkout service

use anyhow::Result;
use neela_storefront::{build_router, publisher::EventPublisher, AppConfig, AppState, Storage};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = AppConfig::from_env()?;
    let storage = Storage::connect(config.database_url.as_deref()).await?;
    storage.seed().await?;
    let publisher = EventPublisher::connect(config.nats_url.as_deref()).await;

    let port = config.port;
    tracing::info!(storage = storage.backend(), events = publisher.is_enabled(), home_state = %config.shipping.home_state, "starting");
    let app = build_router(AppState::new(storage, publisher, config));

    tracing::info!("Neela storefront listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}
