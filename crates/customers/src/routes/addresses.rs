//! Address route handlers, scoped under a customer.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use customer_service_core::CustomerId;

use crate::db::AddressRepository;
use crate::error::{AppError, Result};
use crate::models::{Address, NewAddress};
use crate::state::AppState;

/// List a customer's addresses.
///
/// GET /v1/customers/{id}/addresses
///
/// An unknown customer yields `[]`, not 404.
///
/// # Errors
///
/// Returns 400 if the ID is not an integer and 500 if the query fails.
pub async fn list(
    State(state): State<AppState>,
    path: std::result::Result<Path<CustomerId>, PathRejection>,
) -> Result<Json<Vec<Address>>> {
    let Path(customer_id) = path?;

    let addresses = AddressRepository::new(state.db())
        .list_for_customer(customer_id)
        .await
        .map_err(AppError::query("Failed to fetch addresses"))?;

    Ok(Json(addresses))
}

/// Add an address from `{line1, area, city, pincode}`.
///
/// POST /v1/customers/{id}/addresses
///
/// The customer's existence is not checked up front; an unknown customer
/// fails the insert on the foreign key and surfaces as 500.
///
/// # Errors
///
/// Returns 400 for a bad ID or body and 500 if the insert fails.
pub async fn create(
    State(state): State<AppState>,
    path: std::result::Result<Path<CustomerId>, PathRejection>,
    body: std::result::Result<Json<NewAddress>, JsonRejection>,
) -> Result<(StatusCode, Json<Address>)> {
    let Path(customer_id) = path?;
    let Json(new_address) = body?;

    let address = AddressRepository::new(state.db())
        .create(customer_id, &new_address)
        .await
        .map_err(AppError::query("Insert failed"))?;

    tracing::info!(
        customer_id = %customer_id,
        address_id = %address.id,
        "Address created"
    );
    Ok((StatusCode::CREATED, Json(address)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{app_without_database, send};

    #[tokio::test]
    async fn test_list_database_failure_is_500() {
        let (status, body) =
            send(app_without_database(), "GET", "/v1/customers/7/addresses", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to fetch addresses" }));
    }

    #[tokio::test]
    async fn test_create_database_failure_is_500() {
        let (status, body) = send(
            app_without_database(),
            "POST",
            "/v1/customers/7/addresses",
            Some(r#"{"line1":"1 Main St","area":"Central","city":"Pune","pincode":"411001"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Insert failed" }));
    }

    #[tokio::test]
    async fn test_create_bad_customer_id_is_400() {
        let (status, _) = send(
            app_without_database(),
            "POST",
            "/v1/customers/x/addresses",
            Some(r#"{"line1":"1 Main St"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_with_numeric_pincode_reaches_the_database() {
        let (status, body) = send(
            app_without_database(),
            "POST",
            "/v1/customers/7/addresses",
            Some(r#"{"line1":"1 Main St","area":"Central","city":"Pune","pincode":411001}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Insert failed" }));
    }
}
