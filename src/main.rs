use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trip_packager::server::{app, AppState};
use trip_packager::{EngineConfig, InMemoryPlanStore, PackageAssembler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trip_packager=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env()?;
    tracing::info!(config = ?config, "Starting trip packager");

    let assembler = PackageAssembler::from_config(&config)?;
    let state = AppState {
        assembler: Arc::new(assembler),
        plans: Arc::new(InMemoryPlanStore::new()),
    };

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr).await?;
    tracing::info!("Listening on {}", config.server.bind_addr);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
