//! activity-registry - request submission and review backend.
//!
//! Students submit an activity claim with an attached document; an admin
//! reviews, approves, rejects or deletes it.

mod api;
mod config;
mod db;
mod error;
mod http;
mod metrics;
mod telemetry;

use crate::api::{AdminSecret, AppState};
use crate::config::Config;
use crate::db::Database;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "Refusing to start with {} configuration error(s). See error messages above.",
            errors.len()
        ));
    }

    if config::is_weak_password(&config.admin.password) {
        warn!("admin.password is short; set a longer secret for production use");
    }

    info!(
        listen = %config.server.listen,
        database = %config.database.path,
        origins = ?config.cors.allowed_origins,
        max_body_bytes = config.uploads.max_body_bytes,
        "Starting activity-registry"
    );

    let db = Database::new(&config.database.path).await?;
    let state = AppState::new(db.clone(), AdminSecret::new(&config.admin.password));

    // Convention: metrics_port = 0 disables the metrics endpoint (used by tests).
    let metrics_port = config.server.metrics_port.unwrap_or(9090);
    if metrics_port == 0 {
        info!("Metrics disabled");
    } else {
        metrics::init();
        info!("Metrics initialized");

        tokio::spawn(async move {
            http::run_metrics_server(metrics_port).await;
        });
        info!(port = metrics_port, "Prometheus HTTP server started");
    }

    let app = api::router(state, &config.cors, &config.uploads);
    let listener = tokio::net::TcpListener::bind(config.server.listen).await?;
    info!(addr = %config.server.listen, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.pool().close().await;
    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
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
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
