//! greenloop-web - Waste Reporting & Rewards Web Service
//!
//! Serves the report/landing/login pages and the JSON API behind
//! them: session resolution, AI waste verification, report
//! persistence, reward points, and impact aggregates.

use anyhow::Result;
use greenloop_common::config::Config;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use greenloop_web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting greenloop-web (Waste Reporting & Rewards)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve configuration (ENV over TOML over defaults)
    let config = Config::load()?;
    config.log_key_status();

    // Open or create the database
    info!("Database: {}", config.database_path.display());
    let db_pool = greenloop_web::db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    // Create application state
    let state = AppState::new(db_pool, &config)?;

    // Build router
    let app = greenloop_web::build_router(state);

    // Start server
    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Report page: http://{}/report", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
