//! Customer repository for database operations.
//!
//! Statements are plain strings with positional parameters; values are always
//! bound, never spliced into the SQL text.

use customer_service_core::CustomerId;

use super::{Database, RepositoryError};
use crate::models::{Customer, NewCustomer};

/// Columns every customer statement yields. `created_at` is cast so a plain
/// `TIMESTAMP` column decodes as well as `TIMESTAMPTZ`.
macro_rules! customer_columns {
    () => {
        "customer_id, name, email, phone, created_at::timestamptz AS created_at"
    };
}

const LIST_CUSTOMERS: &str = concat!(
    "SELECT ",
    customer_columns!(),
    " FROM customer_schema.customers ORDER BY customer_id"
);

const GET_CUSTOMER: &str = concat!(
    "SELECT ",
    customer_columns!(),
    " FROM customer_schema.customers WHERE customer_id = $1"
);

const INSERT_CUSTOMER: &str = concat!(
    "INSERT INTO customer_schema.customers (name, email, phone) VALUES ($1, $2, $3) RETURNING ",
    customer_columns!()
);

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    db: &'a Database,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// List every customer in ascending ID order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        self.db
            .run_query(sqlx::query_as::<_, Customer>(LIST_CUSTOMERS))
            .await
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let rows = self
            .db
            .run_query(sqlx::query_as::<_, Customer>(GET_CUSTOMER).bind(id))
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Insert a customer and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, customer: &NewCustomer) -> Result<Customer, RepositoryError> {
        let rows = self
            .db
            .run_query(
                sqlx::query_as::<_, Customer>(INSERT_CUSTOMER)
                    .bind(customer.name.as_deref())
                    .bind(customer.email.as_deref())
                    .bind(customer.phone.as_deref()),
            )
            .await?;
        single_row(rows)
    }
}

/// Take the one row an `INSERT ... RETURNING` yields.
pub(super) fn single_row<T>(rows: Vec<T>) -> Result<T, RepositoryError> {
    rows.into_iter()
        .next()
        .ok_or(RepositoryError::Database(sqlx::Error::RowNotFound))
}
