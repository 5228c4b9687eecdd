pub mod create_customer;
pub mod list_customer_invoices;
pub mod list_customers;

pub use create_customer::{CreateCustomerCommand, CreateCustomerResponse, CreateCustomerUseCase};
pub use list_customer_invoices::{
  InvoiceDto, InvoiceLineItemDto, ListCustomerInvoicesCommand, ListCustomerInvoicesResponse,
  ListCustomerInvoicesUseCase, PartyDto,
};
pub use list_customers::{CustomerDto, ListCustomersResponse, ListCustomersUseCase};
