//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{init_environment, AppError, AppResult};
use crate::infra::{mailer, Database, LocalFileStorage};

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!(environment = ?config.environment, "Starting server...");
    init_environment(config.environment);

    // Initialize database and bring the schema up to date
    let db = Arc::new(Database::connect(&config.database_url).await?);
    tracing::info!("Database connected");
    db.run_migrations().await?;
    tracing::info!("Migrations applied");

    // Upload directories must exist before the first avatar arrives
    LocalFileStorage::new(config.upload_dir.clone())
        .ensure_dirs()
        .await?;

    let mailer = mailer::from_settings(&config.mail)?;

    let app_state = AppState::from_config(db, mailer, &config);

    // Build router
    let app = create_router(app_state);

    // Start server
    let addr = format!(
        "{}:{}",
        args.host.unwrap_or_else(|| config.server_host.clone()),
        args.port.unwrap_or(config.server_port)
    );
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);
    tracing::info!("API documentation at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
