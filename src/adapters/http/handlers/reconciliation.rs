use actix_web::{HttpResponse, web};
use std::sync::Arc;
use validator::Validate;

use crate::{
  adapters::http::{
    dtos::{ReconciliationRequest, SuggestionsRequest},
    errors::ApiError,
  },
  application::reconciliation::*,
  domain::reconciliation::ColumnSelection,
};

/// Generate draft invoices from a reconciled table
/// POST /api/v1/reconciliation/invoices
pub async fn generate_invoices_handler(
  request: web::Json<ReconciliationRequest>,
  use_case: web::Data<Arc<GenerateInvoicesUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;
  let request = request.into_inner();

  let command = GenerateInvoicesCommand {
    table: request.table,
    groups: request.groups,
    columns: request.columns.map(ColumnSelection::from),
    strategy: request.strategy,
    no_match_label: request.no_match_label,
  };

  let response = use_case.execute(command).await?;

  Ok(HttpResponse::Ok().json(response))
}

/// Reconciliation statistics, no side effects
/// POST /api/v1/reconciliation/summary
pub async fn summarize_handler(
  request: web::Json<ReconciliationRequest>,
  use_case: web::Data<Arc<SummarizeReconciliationUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;
  let request = request.into_inner();

  let command = SummarizeReconciliationCommand {
    table: request.table,
    groups: request.groups,
    columns: request.columns.map(ColumnSelection::from),
    strategy: request.strategy,
    no_match_label: request.no_match_label,
  };

  let stats = use_case.execute(command)?;

  Ok(HttpResponse::Ok().json(stats))
}

/// Customer suggestions for groups without one
/// POST /api/v1/reconciliation/suggestions
pub async fn suggest_customers_handler(
  request: web::Json<SuggestionsRequest>,
  use_case: web::Data<Arc<SuggestCustomersUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let command = SuggestCustomersCommand {
    groups: request.into_inner().groups,
  };

  let response = use_case.execute(command).await?;

  Ok(HttpResponse::Ok().json(response))
}
