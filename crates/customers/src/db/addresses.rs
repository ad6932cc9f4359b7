//! Address repository for database operations.
//!
//! Addresses are always scoped to a customer. Whether that customer exists
//! is left to the foreign key on `addresses.customer_id`.

use customer_service_core::CustomerId;

use super::customers::single_row;
use super::{Database, RepositoryError};
use crate::models::{Address, NewAddress};

const LIST_ADDRESSES: &str = r"
    SELECT *
    FROM customer_schema.addresses
    WHERE customer_id = $1
";

const INSERT_ADDRESS: &str = r"
    INSERT INTO customer_schema.addresses (customer_id, line1, area, city, pincode)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING *
";

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    db: &'a Database,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// List a customer's addresses. An unknown customer yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Address>, RepositoryError> {
        self.db
            .run_query(sqlx::query_as::<_, Address>(LIST_ADDRESSES).bind(customer_id))
            .await
    }

    /// Insert an address for a customer and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails, including a
    /// foreign key violation for an unknown customer.
    pub async fn create(
        &self,
        customer_id: CustomerId,
        address: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let rows = self
            .db
            .run_query(
                sqlx::query_as::<_, Address>(INSERT_ADDRESS)
                    .bind(customer_id)
                    .bind(address.line1.as_deref())
                    .bind(address.area.as_deref())
                    .bind(address.city.as_deref())
                    .bind(address.pincode.as_deref()),
            )
            .await?;
        single_row(rows)
    }
}
