pub mod customer_repository;
pub mod invoice_repository;

pub use customer_repository::PostgresCustomerRepository;
pub use invoice_repository::PostgresInvoiceRepository;

use sqlx::error::ErrorKind;

use crate::domain::invoice::InvoiceError;

/// SQLSTATE raised when a value does not fit its NUMERIC column.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Constraint violations, out-of-range amounts and vanished rows are refusals; anything
/// else is a store failure. Returns the refusal reason.
pub(crate) fn rejection_reason(error: sqlx::Error) -> Result<String, InvoiceError> {
  match error {
    sqlx::Error::Database(db) if !matches!(db.kind(), ErrorKind::Other) => {
      Ok(db.message().to_string())
    }
    sqlx::Error::Database(db) if db.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) => {
      Ok(db.message().to_string())
    }
    sqlx::Error::RowNotFound => Ok("Row not found".to_string()),
    other => Err(other.into()),
  }
}
