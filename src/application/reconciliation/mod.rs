pub mod generate_invoices;
pub mod suggest_customers;
pub mod summarize_reconciliation;

pub use generate_invoices::{
  GenerateInvoicesCommand, GenerateInvoicesResponse, GenerateInvoicesUseCase, StatusDto,
};
pub use suggest_customers::{
  CustomerSuggestionDto, SuggestCustomersCommand, SuggestCustomersResponse,
  SuggestCustomersUseCase,
};
pub use summarize_reconciliation::{SummarizeReconciliationCommand, SummarizeReconciliationUseCase};
