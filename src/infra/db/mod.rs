//! Postgres-backed repository implementations.

mod documents;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;
use std::time::{Duration, Instant};

use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    query,
};
use tracing::{debug, info};

use crate::application::repos::RepoError;

use super::error::InfraError;

const READINESS_POLL_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Build a lazily connecting pool; nothing is dialled until first use.
    pub fn connect_lazy(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(url)
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), InfraError> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|err| InfraError::migration(err.to_string()))
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    /// Ping the database every 300 ms until it answers or `timeout` elapses.
    pub async fn wait_until_ready(&self, timeout: Duration) -> Result<(), InfraError> {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            match self.health_check().await {
                Ok(()) => {
                    info!(
                        target = "infra::db",
                        attempts,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Database is ready"
                    );
                    return Ok(());
                }
                Err(err) if started.elapsed() + READINESS_POLL_INTERVAL > timeout => {
                    return Err(InfraError::database_unavailable(timeout, err.to_string()));
                }
                Err(err) => {
                    debug!(
                        target = "infra::db",
                        attempts,
                        error = %err,
                        "Database not ready yet"
                    );
                    tokio::time::sleep(READINESS_POLL_INTERVAL).await;
                }
            }
        }
    }

    fn convert_count(value: i64) -> Result<u64, RepoError> {
        value
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }
}
