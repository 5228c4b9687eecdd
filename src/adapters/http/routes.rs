use actix_web::web;
use std::sync::Arc;

use crate::application::invoice::{
  CreateCustomerUseCase, ListCustomerInvoicesUseCase, ListCustomersUseCase,
};
use crate::application::reconciliation::{
  GenerateInvoicesUseCase, SuggestCustomersUseCase, SummarizeReconciliationUseCase,
};

use super::handlers::customers::{
  create_customer_handler, list_customer_invoices_handler, list_customers_handler,
};
use super::handlers::reconciliation::{
  generate_invoices_handler, suggest_customers_handler, summarize_handler,
};

/// Configure reconciliation routes
///
/// Mounts the invoice generation endpoints under the provided scope
/// (e.g., /api/v1/reconciliation).
///
/// # Routes
///
/// - POST /invoices - Aggregate matched rows and emit draft invoices
/// - POST /summary - Reconciliation statistics without writing anything
/// - POST /suggestions - Propose customers for unassigned groups
///
/// # Example
///
/// ```no_run
/// use actix_web::{App, web};
/// use std::sync::Arc;
/// # use reconbill::application::reconciliation::*;
/// # use reconbill::adapters::http::routes::configure_reconciliation_routes;
///
/// # async fn example(
/// #   generate_use_case: Arc<GenerateInvoicesUseCase>,
/// #   summarize_use_case: Arc<SummarizeReconciliationUseCase>,
/// #   suggest_use_case: Arc<SuggestCustomersUseCase>,
/// # ) {
/// let app = App::new().service(
///   web::scope("/api/v1/reconciliation").configure(|cfg| {
///     configure_reconciliation_routes(cfg, generate_use_case, summarize_use_case, suggest_use_case)
///   }),
/// );
/// # }
/// ```
pub fn configure_reconciliation_routes(
  cfg: &mut web::ServiceConfig,
  generate_use_case: Arc<GenerateInvoicesUseCase>,
  summarize_use_case: Arc<SummarizeReconciliationUseCase>,
  suggest_use_case: Arc<SuggestCustomersUseCase>,
) {
  cfg
    .app_data(web::Data::new(generate_use_case))
    .app_data(web::Data::new(summarize_use_case))
    .app_data(web::Data::new(suggest_use_case))
    .route("/invoices", web::post().to(generate_invoices_handler))
    .route("/summary", web::post().to(summarize_handler))
    .route("/suggestions", web::post().to(suggest_customers_handler));
}

/// Configure customer routes
///
/// # Routes
///
/// - POST / - Create a customer
/// - GET / - List customers with running totals
/// - GET /{customer_id}/invoices - Invoices emitted for one customer
pub fn configure_customer_routes(
  cfg: &mut web::ServiceConfig,
  create_use_case: Arc<CreateCustomerUseCase>,
  list_use_case: Arc<ListCustomersUseCase>,
  list_invoices_use_case: Arc<ListCustomerInvoicesUseCase>,
) {
  cfg
    .app_data(web::Data::new(create_use_case))
    .app_data(web::Data::new(list_use_case))
    .app_data(web::Data::new(list_invoices_use_case))
    .route("", web::post().to(create_customer_handler))
    .route("", web::get().to(list_customers_handler))
    .route(
      "/{customer_id}/invoices",
      web::get().to(list_customer_invoices_handler),
    );
}
