mod config;
mod editor;
mod errors;
mod invariants;
mod layout;
mod models;
mod pool;
mod routes;
mod selection;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::pool::{CandidateStore, JsonFileStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Bracket API v{}", env!("CARGO_PKG_VERSION"));

    // Load the candidate pool once; the engine treats it as read-only
    let store = JsonFileStore::new(&config.pool_path);
    let pool = store.load().await?;

    let state = AppState::new(config.clone(), pool);
    info!(
        "Layout font: {:?} {}px",
        state.layout_config.font.family, state.layout_config.font.size_px
    );
    if let Some(seed) = config.rng_seed {
        info!("Sampling with fixed RNG seed {seed}");
    }

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the admin console has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
