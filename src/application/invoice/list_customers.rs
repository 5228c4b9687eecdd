use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;

use crate::domain::invoice::{Customer, CustomerService, InvoiceError};

#[derive(Debug, Clone, Serialize)]
pub struct CustomerDto {
  pub id: String,
  pub name: String,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub address: Option<String>,
  pub total10: Decimal,
  pub total20: Decimal,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<&Customer> for CustomerDto {
  fn from(customer: &Customer) -> Self {
    Self {
      id: customer.id.value().to_string(),
      name: customer.name.value().to_string(),
      email: customer.email.clone(),
      phone: customer.phone.clone(),
      address: customer.address.clone(),
      total10: customer.totals.total10,
      total20: customer.totals.total20,
      created_at: customer.created_at,
      updated_at: customer.updated_at,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ListCustomersResponse {
  pub customers: Vec<CustomerDto>,
}

pub struct ListCustomersUseCase {
  customer_service: Arc<CustomerService>,
}

impl ListCustomersUseCase {
  pub fn new(customer_service: Arc<CustomerService>) -> Self {
    Self { customer_service }
  }

  pub async fn execute(&self) -> Result<ListCustomersResponse, InvoiceError> {
    let customers = self.customer_service.list_customers().await?;

    Ok(ListCustomersResponse {
      customers: customers.iter().map(CustomerDto::from).collect(),
    })
  }
}
