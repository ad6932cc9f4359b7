//! Address types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use customer_service_core::{AddressId, CustomerId};

use super::json_as_text;

/// A persisted address row, owned by exactly one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Address {
    pub id: AddressId,
    pub customer_id: CustomerId,
    pub line1: Option<String>,
    pub area: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
}

/// Request body for `POST /v1/customers/:id/addresses`.
///
/// The owning customer comes from the path, not the body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAddress {
    #[serde(default, deserialize_with = "json_as_text")]
    pub line1: Option<String>,
    #[serde(default, deserialize_with = "json_as_text")]
    pub area: Option<String>,
    #[serde(default, deserialize_with = "json_as_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "json_as_text")]
    pub pincode: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_numeric_pincode_is_sent_as_text() {
        let body: NewAddress =
            serde_json::from_value(json!({ "line1": "1 Main St", "pincode": 411_001 })).unwrap();
        assert_eq!(body.line1.as_deref(), Some("1 Main St"));
        assert_eq!(body.pincode.as_deref(), Some("411001"));
        assert!(body.area.is_none());
        assert!(body.city.is_none());
    }
}
