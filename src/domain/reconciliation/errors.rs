use crate::domain::invoice::InvoiceError;

#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
  #[error("Output file configuration missing")]
  MissingOutputConfiguration,

  #[error("No customer assigned to any matched group")]
  NoCustomerAssigned,

  #[error("Validation error: {0}")]
  Validation(String),

  #[error("Store error: {0}")]
  Store(#[from] InvoiceError),
}
