use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PoolError, PooledConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::borrow::Cow;

pub type ConnectionPool = Pool<ConnectionManager<PgConnection>>;
pub type Connection = PooledConnection<ConnectionManager<PgConnection>>;

/// Builds the database connection pool, sized to the async runtime's worker
/// count since every worker checks out at most one connection at a time.
pub fn create_pool(database_url: String) -> Result<ConnectionPool, PoolError> {
    let num_threads = tokio::runtime::Handle::try_current()
        .map(|handle| handle.metrics().num_workers())
        .unwrap_or(1);
    let manager = ConnectionManager::new(database_url);
    Pool::builder()
        .max_size(num_threads as u32)
        .max_lifetime(None)
        .idle_timeout(None)
        .test_on_check_out(true)
        .build(manager)
}

/// Runs embedded migrations on the database. Used to update database for end-users who don't build server themselves.
pub fn run_migrations(conn: &mut PgConnection) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    conn.run_pending_migrations(MIGRATIONS).map(|_| ())
}

/// Returns a url for the database using `POSTGRES_USER`, `POSTGRES_PASSWORD`, and `POSTGRES_DB`
/// environment variables. `POSTGRES_HOST` overrides the hostname, which defaults to localhost.
/// If `database_override` is not `None`, then its value will be used in place of `POSTGRES_DB`.
pub fn create_url(database_override: Option<&str>) -> Result<String, std::env::VarError> {
    // A missing .env file is fine when the variables come from the environment itself
    let _ = dotenvy::dotenv();

    let user = std::env::var("POSTGRES_USER")?;
    let password = std::env::var("POSTGRES_PASSWORD")?;
    let database = match database_override {
        Some(database) => Cow::Borrowed(database),
        None => Cow::Owned(std::env::var("POSTGRES_DB")?),
    };
    let hostname = std::env::var("POSTGRES_HOST").unwrap_or_else(|_| String::from("localhost"));

    Ok(format!("postgres://{user}:{password}@{hostname}/{database}"))
}

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
