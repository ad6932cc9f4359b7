//! Domain models for customers and addresses.
//!
//! Row types derive `sqlx::FromRow` so the repositories can decode whatever
//! `RETURNING *` / `SELECT *` yields, and `Serialize` so handlers can echo them
//! back unchanged. Input types keep every field optional and accept any JSON
//! value for it: the store's column types and constraints decide what is
//! acceptable.

pub mod address;
pub mod customer;

pub use address::{Address, NewAddress};
pub use customer::{Customer, NewCustomer};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Read a body field bound to a text column.
///
/// `null` stays `NULL` and strings pass through. Any other value is sent as
/// its JSON text, so `555` is stored as `"555"`.
fn json_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}
