//! Customer types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use customer_service_core::CustomerId;

use super::json_as_text;

/// A persisted customer row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Customer {
    /// Server-generated identifier.
    pub customer_id: CustomerId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Set by the database on insert, never updated.
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /v1/customers`.
///
/// Missing fields are inserted as `NULL`; non-string values are sent as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCustomer {
    #[serde(default, deserialize_with = "json_as_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "json_as_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "json_as_text")]
    pub phone: Option<String>,
}
