use anyhow::Context;
use clap::Parser;
use paperdesk::config::{Cli, Settings};
use paperdesk::{create_router, AppState, SqlitePersistence};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = Settings::load(&cli).context("Failed to load configuration")?;
    setup_logging(&settings.log.filter);

    tracing::info!("🚀 Paperdesk API starting");

    // Schema is created/migrated once here, before any request is served
    let db = SqlitePersistence::new(&settings.database.url, settings.database.max_connections)
        .await
        .with_context(|| format!("Failed to open database at {}", settings.database.url))?;

    let static_dir = settings
        .server
        .static_dir
        .as_deref()
        .filter(|dir| dir.exists());

    if let (Some(configured), None) = (&settings.server.static_dir, static_dir) {
        tracing::warn!(
            "Static directory {} does not exist, front end will not be served",
            configured.display()
        );
    }

    let app = create_router(AppState::new(db), static_dir);

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!("📡 Listening on http://{}", address);
    tracing::info!("Press Ctrl+C to stop...");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("👋 Paperdesk stopped");
    Ok(())
}

fn setup_logging(default_filter: &str) {
    // RUST_LOG takes precedence over the configured filter
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        // Keep serving; the process can still be stopped externally
        std::future::pending::<()>().await;
    }

    tracing::info!("⚠️  Received Ctrl+C, shutting down...");
}
