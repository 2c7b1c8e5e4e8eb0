use crate::config::Config;
use crate::db::{self, Connection, ConnectionPool};
use crate::vote::{LedgerError, VoteLedger};
use crate::{api, filesystem};
use axum::ServiceExt;
use axum::extract::Request;
use diesel::r2d2::PoolError;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal::unix::SignalKind;
use tower::layer::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    EnvVar(#[from] std::env::VarError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Failed to run migrations: {0}")]
    Migration(String),
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Shared state handed to every handler: the configuration, the database
/// connection pool, and the device vote ledger.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pool: ConnectionPool,
    pub votes: Arc<VoteLedger>,
}

impl AppState {
    pub fn new(config: Config, pool: ConnectionPool, votes: VoteLedger) -> Self {
        Self {
            config: Arc::new(config),
            pool,
            votes: Arc::new(votes),
        }
    }

    /// Returns a connection to the database from the connection pool.
    pub fn get_connection(&self) -> Result<Connection, PoolError> {
        self.pool.get()
    }
}

pub fn enable_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug,tower_http=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Reads configuration, prepares the data directories and vote ledger, and
/// connects to the database, running any pending migrations.
pub fn initialize() -> Result<AppState, InitializationError> {
    let config = Config::read()?;
    filesystem::create_data_directories(&config)?;
    let votes = VoteLedger::load(config.vote_ledger_path())?;

    let database_url = db::create_url(None)?;
    let pool = db::create_pool(database_url)?;
    let mut conn = pool.get()?;
    db::run_migrations(&mut conn).map_err(|err| InitializationError::Migration(err.to_string()))?;

    Ok(AppState::new(config, pool, votes))
}

pub async fn run(state: AppState) {
    let port = state.config.port;
    let app = NormalizePathLayer::trim_trailing_slash().layer(api::routes(state));

    let address = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(address).await.expect("Port should be bindable");
    if let Ok(address) = listener.local_addr() {
        tracing::debug!("listening on {address}");
    }
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server should be startable");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    println!("Stopping server...")
}
