use async_trait::async_trait;

use super::entities::{Customer, Invoice, RunningTotals};
use super::errors::InvoiceError;
use super::value_objects::CustomerId;

/// Result of a write the store completed without failing outright.
///
/// `Rejected` is a recoverable refusal (constraint violation, stale row); callers count it
/// and carry on. An `Err` from a repository is unrecoverable and should abort the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
  Saved,
  Rejected(String),
}

impl SaveOutcome {
  pub fn is_saved(&self) -> bool {
    matches!(self, SaveOutcome::Saved)
  }
}

/// Result of adding a delta to a customer's running totals.
#[derive(Debug, Clone, PartialEq)]
pub enum TotalsUpdate {
  /// The customer as stored after the increment.
  Applied(Customer),
  Rejected(String),
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
  async fn create(&self, customer: Customer) -> Result<Customer, InvoiceError>;
  /// Increments the stored totals by `delta` in one atomic step.
  async fn add_totals(
    &self,
    id: &CustomerId,
    delta: &RunningTotals,
  ) -> Result<TotalsUpdate, InvoiceError>;
  async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, InvoiceError>;
  async fn find_all(&self) -> Result<Vec<Customer>, InvoiceError>;
}

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
  async fn save(&self, invoice: &Invoice) -> Result<SaveOutcome, InvoiceError>;
  async fn find_by_customer(&self, customer_id: &CustomerId) -> Result<Vec<Invoice>, InvoiceError>;
}
