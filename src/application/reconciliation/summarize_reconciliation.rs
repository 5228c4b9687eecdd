use serde::Deserialize;
use std::sync::Arc;

use crate::domain::reconciliation::{
  ColumnSelection, GroupConfigurations, ReconciliationError, ReconciliationRun,
  ReconciliationService, ReconciliationStats, ResolutionStrategy, Table,
};

#[derive(Debug, Deserialize)]
pub struct SummarizeReconciliationCommand {
  pub table: Table,
  pub groups: GroupConfigurations,
  pub columns: Option<ColumnSelection>,
  pub strategy: Option<ResolutionStrategy>,
  pub no_match_label: Option<String>,
}

pub struct SummarizeReconciliationUseCase {
  reconciliation_service: Arc<ReconciliationService>,
}

impl SummarizeReconciliationUseCase {
  pub fn new(reconciliation_service: Arc<ReconciliationService>) -> Self {
    Self {
      reconciliation_service,
    }
  }

  pub fn execute(
    &self,
    command: SummarizeReconciliationCommand,
  ) -> Result<ReconciliationStats, ReconciliationError> {
    let run = ReconciliationRun {
      table: command.table,
      groups: command.groups,
      columns: command.columns,
      strategy: command.strategy,
      no_match_label: command.no_match_label,
    };

    self.reconciliation_service.summarize(&run)
  }
}
