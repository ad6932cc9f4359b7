//! Customer Service - JSON CRUD over customers and their addresses.
//!
//! # Architecture
//!
//! - Axum router, one handler per verb and path
//! - `PostgreSQL` through a lazily connected `sqlx` pool (max 10 connections)
//! - Startup waits for the database before binding the listener
//!
//! # Startup
//!
//! 1. Load configuration from the environment (and `.env` if present)
//! 2. Initialize Sentry and tracing
//! 3. Poll the database (15 attempts, 2s apart by default)
//! 4. Serve until Ctrl+C or SIGTERM, then close the pool
//!
//! The process exits with status 1 if the database never becomes reachable.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use customer_service::config::ServiceConfig;
use customer_service::db::{Database, wait_for_db};
use customer_service::error::StartupError;
use customer_service::routes;
use customer_service::state::AppState;
use customer_service::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing(&config);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start server");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServiceConfig) -> Result<(), StartupError> {
    let db = Database::connect_lazy(&config.postgres);
    tracing::info!(
        host = %config.postgres.host,
        port = config.postgres.port,
        database = %config.postgres.database,
        "Database pool created"
    );

    if let Err(e) = wait_for_db(&db, config.readiness).await {
        db.close().await;
        return Err(e);
    }

    let addr = config.socket_addr();
    let app = routes::app(AppState::new(config, db.clone()));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Customer service running on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Database pool closed");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
