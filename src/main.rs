// Travel planner API entry point.
//
// Startup sequence:
// 1. Initialize tracing
// 2. Load config (auto-creating default files on first run)
// 3. Open the SQLite store
// 4. Build service wrappers and the LLM client
// 5. Serve the HTTP API until shutdown

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use waypoint::config;
use waypoint::db;
use waypoint::llm::client::LlmClient;
use waypoint::routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Waypoint API starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: port={}, db={}",
        config.server.port, config.server.db_path
    );

    let db = Arc::new(
        db::Database::open(&config.server.db_path).context("failed to open database")?,
    );
    info!("Database opened at {}", config.server.db_path);

    let state = routes::AppState::new(&config, db);
    match state.llm.as_ref() {
        LlmClient::Active(_) => info!("LLM client initialized (API key configured)"),
        LlmClient::Disabled => info!("LLM client disabled (no API key); serving mock itineraries"),
    }

    let app = routes::router(state);
    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .await
        .context("server error")?;

    info!("Waypoint API shut down cleanly");
    Ok(())
}

/// Initialize tracing to stderr, filtered by RUST_LOG (default info).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;
    Ok(())
}
