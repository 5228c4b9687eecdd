use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::invoice::{CustomerDto, InvoiceDto};
use crate::domain::reconciliation::{
  ColumnSelection, GroupConfigurations, ReconciliationError, ReconciliationRun,
  ReconciliationService, ResolutionStrategy, RunOutcome, StatusLevel, StatusMessage, Table,
};
use crate::infrastructure::reporting::BufferedStatusReporter;

#[derive(Debug, Deserialize)]
pub struct GenerateInvoicesCommand {
  pub table: Table,
  pub groups: GroupConfigurations,
  pub columns: Option<ColumnSelection>,
  pub strategy: Option<ResolutionStrategy>,
  pub no_match_label: Option<String>,
}

impl From<GenerateInvoicesCommand> for ReconciliationRun {
  fn from(command: GenerateInvoicesCommand) -> Self {
    ReconciliationRun {
      table: command.table,
      groups: command.groups,
      columns: command.columns,
      strategy: command.strategy,
      no_match_label: command.no_match_label,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusDto {
  pub level: StatusLevel,
  pub message: String,
}

impl From<&StatusMessage> for StatusDto {
  fn from(message: &StatusMessage) -> Self {
    Self {
      level: message.level(),
      message: message.to_string(),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct GenerateInvoicesResponse {
  pub outcome: RunOutcome,
  pub success_count: usize,
  pub fail_count: usize,
  pub rejected_customer_updates: usize,
  pub invoices: Vec<InvoiceDto>,
  pub customer_updates: Vec<CustomerDto>,
  pub skipped_customers: Vec<String>,
  pub messages: Vec<StatusDto>,
}

pub struct GenerateInvoicesUseCase {
  reconciliation_service: Arc<ReconciliationService>,
}

impl GenerateInvoicesUseCase {
  pub fn new(reconciliation_service: Arc<ReconciliationService>) -> Self {
    Self {
      reconciliation_service,
    }
  }

  pub async fn execute(
    &self,
    command: GenerateInvoicesCommand,
  ) -> Result<GenerateInvoicesResponse, ReconciliationError> {
    let run = ReconciliationRun::from(command);
    let reporter = BufferedStatusReporter::default();

    let report = self
      .reconciliation_service
      .generate_invoices(&run, &reporter)
      .await?;

    Ok(GenerateInvoicesResponse {
      outcome: report.outcome(),
      success_count: report.success_count,
      fail_count: report.fail_count,
      rejected_customer_updates: report.rejected_customer_updates,
      invoices: report.invoices.iter().map(InvoiceDto::from).collect(),
      customer_updates: report.customer_updates.iter().map(CustomerDto::from).collect(),
      skipped_customers: report
        .skipped_customers
        .iter()
        .map(|id| id.value().to_string())
        .collect(),
      messages: reporter.messages().iter().map(StatusDto::from).collect(),
    })
  }
}
