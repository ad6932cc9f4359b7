//! Database access for the customer service.
//!
//! # Database: `customer_db`
//!
//! The schema is owned outside this service (see `schema.sql` in the crate
//! root for the expected shape):
//!
//! ## Tables
//!
//! - `customer_schema.customers` - Customers
//! - `customer_schema.addresses` - Addresses, each referencing a customer
//!
//! # Lifecycle
//!
//! A single [`Database`] is built at process start, handed to the router via
//! `AppState`, and closed after the server shuts down. Connections are opened
//! lazily on first use and capped at [`MAX_CONNECTIONS`].

pub mod addresses;
pub mod customers;
pub mod readiness;

use std::time::Duration;

use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::QueryAs;
use sqlx::{Connection, FromRow, PgConnection, PgPool, Postgres};
use thiserror::Error;

use crate::config::PostgresConfig;

pub use addresses::AddressRepository;
pub use customers::CustomerRepository;
pub use readiness::wait_for_db;

/// Upper bound on live connections held by the pool.
pub const MAX_CONNECTIONS: u32 = 10;

/// How long a single [`Database::ping`] may spend opening its connection.
pub const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Opening a probe connection took longer than [`PING_TIMEOUT`].
    #[error("timed out connecting to the database after {0:?}")]
    ConnectTimeout(Duration),
}

/// Handle to the `PostgreSQL` connection pool.
///
/// Cheap to clone; all clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Build the pool without opening any connection.
    ///
    /// Connections are created on demand up to [`MAX_CONNECTIONS`]; callers
    /// past the limit queue until one is released. The configured
    /// `acquire_timeout` is effectively unbounded unless overridden.
    #[must_use]
    pub fn connect_lazy(config: &PostgresConfig) -> Self {
        Self::with_timeout(config, config.acquire_timeout)
    }

    fn with_timeout(config: &PostgresConfig, acquire_timeout: Duration) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .min_connections(0)
            .acquire_timeout(acquire_timeout)
            .connect_lazy_with(config.connect_options());
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run one parameterized statement and return every row it produced.
    ///
    /// The connection is checked out for the duration of the statement and
    /// returned to the pool when it drops, on success and on error alike.
    /// Rows come back in whatever order the statement yields them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if no connection could be acquired
    /// or the statement fails. Nothing is retried.
    pub async fn run_query<'q, T>(
        &self,
        query: QueryAs<'q, Postgres, T, PgArguments>,
    ) -> Result<Vec<T>, RepositoryError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut conn = self.pool.acquire().await?;
        let rows = query.fetch_all(&mut *conn).await?;
        Ok(rows)
    }

    /// Open one connection with the pool's settings and close it again.
    ///
    /// Does not go through the pool, since `Pool::acquire` retries a refused
    /// connection until its acquire timeout runs out. Bounded by
    /// [`PING_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the connection is refused or
    /// rejected, and `RepositoryError::ConnectTimeout` if it hangs.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        let options = self.pool.connect_options();
        let conn = tokio::time::timeout(PING_TIMEOUT, PgConnection::connect_with(&options))
            .await
            .map_err(|_| RepositoryError::ConnectTimeout(PING_TIMEOUT))??;
        conn.close().await?;
        Ok(())
    }

    /// Close every pooled connection. Waits for checked-out connections to
    /// be returned first.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Instant;

    use super::test_support::unreachable_database;
    use super::*;
    use crate::config::ServiceConfig;

    #[tokio::test]
    async fn test_connect_lazy_does_not_connect() {
        let db = unreachable_database();
        assert_eq!(db.pool().size(), 0);
        assert_eq!(db.pool().options().get_max_connections(), MAX_CONNECTIONS);
    }

    #[tokio::test]
    async fn test_ping_fails_against_unreachable_database() {
        let db = unreachable_database();
        let err = db.ping().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Database(_)));
    }

    #[tokio::test]
    async fn test_ping_fails_fast_with_default_acquire_timeout() {
        let config = ServiceConfig::from_lookup(|key| match key {
            "POSTGRES_HOST" => Some("127.0.0.1".to_string()),
            "POSTGRES_PORT" => Some("1".to_string()),
            _ => None,
        })
        .unwrap();
        let db = Database::connect_lazy(&config.postgres);
        assert_eq!(
            db.pool().options().get_acquire_timeout(),
            config.postgres.acquire_timeout
        );

        let started = Instant::now();
        let err = db.ping().await.unwrap_err();

        assert!(matches!(err, RepositoryError::Database(_)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_run_query_propagates_acquire_failure() {
        let db = unreachable_database();
        let result = db
            .run_query(sqlx::query_as::<_, (i32,)>("SELECT $1::int4").bind(1_i32))
            .await;
        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }
}
