use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use levelsmith_core::{build_generator, LevelRelay, RelayConfig};
use levelsmith_gateway::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging Setup
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // 2. Configuration
    let config = RelayConfig::from_env().context("invalid relay configuration")?;

    // 3. The model client: built once, shared by every request.
    // A missing key is not fatal here; requests will fail until it is set.
    let key_var = config.llm.provider.key_var();
    if config.llm.api_key.is_empty() {
        warn!("{key_var} is not set; level generation will fail until it is");
    }
    let generator = build_generator(config.llm.clone());
    let relay = LevelRelay::new(generator, config.validation);
    info!(validation = ?relay.validation(), "Level relay ready");

    // 4. Routes
    let app = router(AppState::new(relay), Some(config.static_dir.as_str()));

    // 5. Start Server
    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Game server running on port {}", config.port);
    info!("Make sure {key_var} is set in environment variables");
    info!(static_dir = %config.static_dir, "Serving static files");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
