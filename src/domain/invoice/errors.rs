use super::value_objects::{CustomerId, ValueObjectError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvoiceError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("Customer not found: {0}")]
  CustomerNotFound(CustomerId),

  #[error("Customer already exists: {0}")]
  CustomerAlreadyExists(CustomerId),

  #[error("No line items provided")]
  NoLineItems,

  #[error("Amount out of range: {0}")]
  AmountOverflow(String),

  #[error("Repository error: {0}")]
  Repository(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}
