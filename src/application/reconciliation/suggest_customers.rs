use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::reconciliation::{GroupConfigurations, ReconciliationError, ReconciliationService};

#[derive(Debug, Deserialize)]
pub struct SuggestCustomersCommand {
  pub groups: GroupConfigurations,
}

#[derive(Debug, Serialize)]
pub struct CustomerSuggestionDto {
  pub group_key: String,
  pub customer_id: Option<String>,
  pub customer_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestCustomersResponse {
  pub suggestions: Vec<CustomerSuggestionDto>,
}

pub struct SuggestCustomersUseCase {
  reconciliation_service: Arc<ReconciliationService>,
}

impl SuggestCustomersUseCase {
  pub fn new(reconciliation_service: Arc<ReconciliationService>) -> Self {
    Self {
      reconciliation_service,
    }
  }

  pub async fn execute(
    &self,
    command: SuggestCustomersCommand,
  ) -> Result<SuggestCustomersResponse, ReconciliationError> {
    let suggestions = self
      .reconciliation_service
      .suggest_customers(&command.groups)
      .await?;

    Ok(SuggestCustomersResponse {
      suggestions: suggestions
        .into_iter()
        .map(|suggestion| CustomerSuggestionDto {
          group_key: suggestion.group_key,
          customer_id: suggestion
            .customer
            .as_ref()
            .map(|c| c.id.value().to_string()),
          customer_name: suggestion
            .customer
            .as_ref()
            .map(|c| c.name.value().to_string()),
        })
        .collect(),
    })
  }
}
