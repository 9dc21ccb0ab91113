use dotenvy::dotenv;
use taproom::{
    api::{self, AppState},
    config::{database, settings, users},
    core::seed,
    errors::Result,
};
use std::sync::Arc;
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

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!("Configuration loaded.");

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed menu and tables listed in config.toml
    seed::seed_from_config(&db, &app_config)
        .await
        .inspect_err(|e| error!("Failed to seed from configuration: {}", e))?;

    // 6. Grant the bootstrap administrator its role
    match users::bootstrap_admin_id() {
        Some(admin_id) => {
            seed::bootstrap_admin(&db, &admin_id, &users::bootstrap_admin_name()).await?;
        }
        None => warn!("ADMIN_USER_ID not set; no administrator was bootstrapped"),
    }

    // 7. Serve the API until Ctrl-C
    let bind_address = app_config.server.bind_address.clone();
    let app = api::router(AppState::new(Arc::new(db), app_config));
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", bind_address, e))?;
    info!("Listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await;
}

/// Resolves once `signal` fires. A signal that cannot be listened for never
/// resolves, so the server keeps running instead of stopping right away.
async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
