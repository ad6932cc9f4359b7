//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /healthz                       - Liveness check (no database access)
//! GET  /healthz/ready                 - Readiness check (pings the pool)
//!
//! # Customers
//! GET  /v1/customers                  - List customers ordered by ID
//! POST /v1/customers                  - Create a customer
//! GET  /v1/customers/{id}             - Get one customer
//!
//! # Addresses
//! GET  /v1/customers/{id}/addresses   - List a customer's addresses
//! POST /v1/customers/{id}/addresses   - Add an address to a customer
//! ```

pub mod addresses;
pub mod customers;
pub mod health;

use axum::{Router, http::Request, routing::get};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the versioned API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(customers::list).post(customers::create))
        .route("/customers/{id}", get(customers::show))
        .route(
            "/customers/{id}/addresses",
            get(addresses::list).post(addresses::create),
        )
}

/// Create all routes without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health::liveness))
        .route("/healthz/ready", get(health::readiness))
        .nest("/v1", api_routes())
}

/// Build the full application: routes, state, and the middleware stack.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes())
        .with_state(state)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::ServiceConfig;
    use crate::db::test_support::unreachable_database;
    use crate::state::AppState;

    /// The full app wired to a database that refuses connections.
    #[allow(clippy::unwrap_used)]
    pub fn app_without_database() -> Router {
        let config = ServiceConfig::from_lookup(|_| None).unwrap();
        super::app(AppState::new(config, unreachable_database()))
    }

    /// Send a request and decode the JSON response body.
    #[allow(clippy::unwrap_used)]
    pub async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}
