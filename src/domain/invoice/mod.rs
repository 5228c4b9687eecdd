pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{Customer, Invoice, InvoiceLineItem, InvoiceTotals, Party, RunningTotals};
pub use errors::InvoiceError;
pub use ports::{CustomerRepository, InvoiceRepository, SaveOutcome, TotalsUpdate};
pub use services::{CustomerData, CustomerService};
pub use value_objects::{
  Currency, CustomerId, CustomerName, InvoiceNumber, InvoiceStatus, ProductClass, TaxRate,
  ValueObjectError,
};
