//! Customer route handlers.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use customer_service_core::CustomerId;

use crate::db::CustomerRepository;
use crate::error::{AppError, Result};
use crate::models::{Customer, NewCustomer};
use crate::state::AppState;

/// List all customers.
///
/// GET /v1/customers
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Customer>>> {
    let customers = CustomerRepository::new(state.db())
        .list()
        .await
        .map_err(AppError::query("Failed to fetch customers"))?;

    Ok(Json(customers))
}

/// Get one customer.
///
/// GET /v1/customers/{id}
///
/// # Errors
///
/// Returns 404 if no customer has this ID, 400 if the ID is not an integer,
/// and 500 if the query fails.
pub async fn show(
    State(state): State<AppState>,
    path: std::result::Result<Path<CustomerId>, PathRejection>,
) -> Result<Json<Customer>> {
    let Path(id) = path?;

    CustomerRepository::new(state.db())
        .get_by_id(id)
        .await
        .map_err(AppError::query("Failed to fetch customer"))?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Create a customer from `{name, email, phone}`.
///
/// POST /v1/customers
///
/// Responds 201 with the stored row, including the generated `customer_id`
/// and `created_at`.
///
/// # Errors
///
/// Returns 400 for a body that is not a JSON object and 500 if the insert
/// fails.
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewCustomer>, JsonRejection>,
) -> Result<(StatusCode, Json<Customer>)> {
    let Json(new_customer) = body?;

    let customer = CustomerRepository::new(state.db())
        .create(&new_customer)
        .await
        .map_err(AppError::query("Insert failed"))?;

    tracing::info!(customer_id = %customer.customer_id, "Customer created");
    Ok((StatusCode::CREATED, Json(customer)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{app_without_database, send};

    #[tokio::test]
    async fn test_list_database_failure_is_500() {
        let (status, body) = send(app_without_database(), "GET", "/v1/customers", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to fetch customers" }));
    }

    #[tokio::test]
    async fn test_show_database_failure_is_500() {
        let (status, body) = send(app_without_database(), "GET", "/v1/customers/1", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to fetch customer" }));
    }

    #[tokio::test]
    async fn test_show_non_integer_id_is_400() {
        let (status, body) = send(app_without_database(), "GET", "/v1/customers/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid id" }));
    }

    #[tokio::test]
    async fn test_create_database_failure_is_500() {
        let (status, body) = send(
            app_without_database(),
            "POST",
            "/v1/customers",
            Some(r#"{"name":"Ann","email":"ann@x.com","phone":"555"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Insert failed" }));
    }

    #[tokio::test]
    async fn test_create_malformed_json_is_400() {
        let (status, body) =
            send(app_without_database(), "POST", "/v1/customers", Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid JSON body" }));
    }

    #[tokio::test]
    async fn test_create_with_numeric_phone_reaches_the_database() {
        let (status, body) = send(
            app_without_database(),
            "POST",
            "/v1/customers",
            Some(r#"{"name":"Ann","email":"ann@x.com","phone":5551234}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Insert failed" }));
    }

    #[tokio::test]
    async fn test_create_without_json_content_type_is_400() {
        let (status, _) = send(app_without_database(), "POST", "/v1/customers", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
