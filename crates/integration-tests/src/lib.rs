//! Integration tests for the customer service.
//!
//! # Running Tests
//!
//! ```bash
//! # Point POSTGRES_* / CUSTOMER_DB at a scratch database, then
//! cargo test -p customer-service-integration-tests -- --ignored
//! ```
//!
//! Each test binary applies `crates/customers/schema.sql`, serves the real
//! router on an ephemeral port, and talks to it over HTTP.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::OnceCell;

use customer_service::config::{ReadinessConfig, ServiceConfig};
use customer_service::db::{Database, wait_for_db};
use customer_service::routes;
use customer_service::state::AppState;

/// Schema the service's queries are written against.
pub const SCHEMA: &str = include_str!("../../customers/schema.sql");

/// Tests in one binary run concurrently; concurrent `CREATE ... IF NOT EXISTS`
/// can still collide in the catalog.
static SCHEMA_APPLIED: OnceCell<()> = OnceCell::const_new();

/// A running service plus direct access to its database.
pub struct TestContext {
    pub client: reqwest::Client,
    pub base_url: String,
    pub db: Database,
}

impl TestContext {
    /// Connect to the configured database, apply the schema, and serve the
    /// router on `127.0.0.1:0`.
    ///
    /// # Panics
    ///
    /// Panics if the database is unreachable or the listener cannot bind.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let config = ServiceConfig::from_env().expect("Failed to load configuration");
        let db = Database::connect_lazy(&config.postgres);

        wait_for_db(
            &db,
            ReadinessConfig {
                max_attempts: 5,
                delay: Duration::from_millis(500),
            },
        )
        .await
        .expect("Test database is not reachable");

        SCHEMA_APPLIED
            .get_or_init(|| async {
                sqlx::raw_sql(SCHEMA)
                    .execute(db.pool())
                    .await
                    .expect("Failed to apply schema");
            })
            .await;

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let app = routes::app(AppState::new(config, db.clone()));
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Test server stopped");
            }
        });

        Self {
            client: reqwest::Client::new(),
            base_url: format!("http://{addr}"),
            db,
        }
    }

    /// Absolute URL for a path on the test server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
