pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod routes;

// Re-export commonly used types
pub use dtos::{
  ColumnSelectionRequest, CreateCustomerRequest, ErrorResponse, HealthResponse,
  ReconciliationRequest, SuggestionsRequest,
};
pub use errors::ApiError;
pub use handlers::health::health_handler;
pub use routes::{configure_customer_routes, configure_reconciliation_routes};
