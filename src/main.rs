use anyhow::{Context, Result};
use std::sync::Arc;

use sudanese_house_backend::{
    app, auth, config, db, logging,
    storage::{MemoryStorage, PgStorage, Storage},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env, settings.log_format);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting Sudanese House backend"
    );

    // Pick the storage backend
    let storage: Arc<dyn Storage> = match settings.database_url.as_deref() {
        Some(url) => {
            let pool = db::create_pool(url, &settings).await?;
            Arc::new(PgStorage::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
            Arc::new(MemoryStorage::new())
        }
    };
    tracing::info!(backend = %storage.backend(), "Storage ready");

    // Make sure the back-office can be reached
    auth::seed_admin(storage.as_ref(), &settings).await?;

    // Create application state
    let state = app::AppState::new(storage, settings.clone());

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.server_addr))?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
