use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
  Info,
  Success,
  Warning,
  Error,
}

/// Human-facing status of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
  InvoicesGenerated(usize),
  InvoicesNotSaved(usize),
  GenerationFailed,
  NoMatchingRows,
  MissingOutputConfiguration,
  QuantityColumnNotSelected,
  NoCustomerAssigned,
  GenerationError,
}

impl StatusMessage {
  pub fn level(&self) -> StatusLevel {
    match self {
      StatusMessage::InvoicesGenerated(_) => StatusLevel::Success,
      StatusMessage::NoMatchingRows => StatusLevel::Info,
      StatusMessage::InvoicesNotSaved(_) | StatusMessage::QuantityColumnNotSelected => {
        StatusLevel::Warning
      }
      StatusMessage::GenerationFailed
      | StatusMessage::MissingOutputConfiguration
      | StatusMessage::NoCustomerAssigned
      | StatusMessage::GenerationError => StatusLevel::Error,
    }
  }
}

impl fmt::Display for StatusMessage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StatusMessage::InvoicesGenerated(n) => write!(f, "{} invoice(s) generated successfully!", n),
      StatusMessage::InvoicesNotSaved(n) => write!(f, "{} invoice(s) could not be saved.", n),
      StatusMessage::GenerationFailed => f.write_str("Failed to generate invoices."),
      StatusMessage::NoMatchingRows => {
        f.write_str("No matching rows found for the selected customers.")
      }
      StatusMessage::MissingOutputConfiguration => f.write_str("Output file configuration missing."),
      StatusMessage::QuantityColumnNotSelected => {
        f.write_str("Quantity column not selected. Invoice quantities might be 0.")
      }
      StatusMessage::NoCustomerAssigned => {
        f.write_str("Please assign a customer to at least one matched group.")
      }
      StatusMessage::GenerationError => f.write_str("An error occurred during generation."),
    }
  }
}

/// Sink for run status messages.
pub trait StatusReporter: Send + Sync {
  fn report(&self, message: StatusMessage);
}
