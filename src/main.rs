use banana_market::api::{self, AppState};
use banana_market::config::credentials::{SERVICE_KEY_VAR, SERVICE_URL_VAR, ServiceCredentials};
use banana_market::config::{database, settings};
use banana_market::core::{cultivar, sweep::SweepPolicy};
use banana_market::errors::Result;
use dotenvy::dotenv;
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also come from the environment
    dotenv().ok();

    // 3. Settings and cultivar seed data
    let settings = settings::load_default_config()?;

    // 4. Database
    let database_url = database::get_database_url();
    if let Some(dir) = sqlite_parent_dir(&database_url) {
        std::fs::create_dir_all(dir)?;
    }
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db).await?;
    let seeded = cultivar::seed_cultivars(&db, &settings.cultivars).await?;
    info!("Database ready ({seeded} cultivars seeded)");

    // 5. Sweep credentials are checked per request, a missing pair only disables sweeps
    let credentials = ServiceCredentials::from_env();
    if credentials.is_none() {
        warn!("{SERVICE_URL_VAR} or {SERVICE_KEY_VAR} not set, sweep endpoints will fail");
    }

    let state = AppState::new(db)
        .with_sweep_policy(SweepPolicy::try_from(settings.sweeps)?)
        .with_credentials(credentials);

    // 6. Serve
    let bind_address =
        env::var("BIND_ADDRESS").unwrap_or_else(|_| settings.server.bind_address.clone());
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on {bind_address}");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Directory holding a file-backed `SQLite` database, if the URL names one.
fn sqlite_parent_dir(database_url: &str) -> Option<&str> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next()?;
    let (dir, _) = path.rsplit_once('/')?;
    (!dir.is_empty()).then_some(dir)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received");
}
