//! skillhub-es (Event Submission) - Skill achievement event recording service
//!
//! Validates incoming skill events, resolves the reporting user, and
//! records events with bounded automatic retry and error-specific
//! side-effect dispatch.

use anyhow::Result;
use clap::Parser;
use skillhub_common::{config, db};
use tracing::info;

/// Skill event submission service
#[derive(Debug, Parser)]
#[command(name = "skillhub-es", version)]
struct Args {
    /// Data directory (overrides SKILLHUB_DATA_DIR and the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Listen port (overrides the service_port setting)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification IMMEDIATELY after tracing init
    info!(
        "Starting Skillhub Event Submission (skillhub-es) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let data_dir = config::resolve_data_dir(args.data_dir.as_deref());
    config::ensure_data_dir(&data_dir)?;

    let db_path = config::database_path(&data_dir);
    info!("Database path: {}", db_path.display());

    let pool = db::connect(&db_path).await?;
    db::init::initialize(&pool).await?;
    info!("✓ Database ready");

    let shared_secret = db::settings::get_shared_secret(&pool).await?;
    if shared_secret == 0 {
        info!("API authentication disabled (api_shared_secret = 0)");
    } else {
        info!("✓ Loaded shared secret for API authentication");
    }

    let port = match args.port {
        Some(port) => port,
        None => db::settings::get_service_port(&pool).await?,
    };

    let state = skillhub_es::AppState::new(pool, shared_secret);
    let app = skillhub_es::build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    info!("skillhub-es listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
