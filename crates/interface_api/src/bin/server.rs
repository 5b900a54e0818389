//! Claims API Server Binary
//!
//! # Usage
//!
//! ```bash
//! API_DATABASE_URL=postgres://... API_FRAUD_SCORER_URL=http://model:8000 cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` / `API_PORT` - Listen address (default: 0.0.0.0:8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_FRAUD_SCORER_URL` - Base URL of the fraud-scoring service
//! * `API_DOCUMENT_ROOT` / `API_DOCUMENT_BASE_URL` - Where uploads land and how they are addressed
//! * `API_LOG_LEVEL` - trace, debug, info, warn, error (default: info)

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_claims::adapters::{HttpFraudScorer, LocalDocumentStore};
use domain_claims::ClaimLifecycle;
use infra_db::{create_pool, run_migrations, DatabaseConfig, PgClaimStore};
use interface_api::{config::ApiConfig, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        scorer = %config.fraud_scorer_url,
        "Starting claims API server"
    );

    let pool = create_pool(
        DatabaseConfig::new(&config.database_url).max_connections(config.database_max_connections),
    )
    .await
    .context("database connection failed")?;
    run_migrations(&pool).await.context("database migrations failed")?;

    let scorer = HttpFraudScorer::new(config.fraud_scorer()).context("fraud scorer client")?;
    let documents = LocalDocumentStore::new(&config.document_root, &config.document_base_url);
    let lifecycle = Arc::new(ClaimLifecycle::new(
        Arc::new(PgClaimStore::new(pool)),
        Arc::new(scorer),
        Arc::new(documents),
    ));

    let app = create_router(lifecycle, config.clone());

    let addr: SocketAddr = config.server_addr().parse().context("invalid listen address")?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM so in-flight requests can finish
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
