use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::invoice::{CustomerData, CustomerId, CustomerName, CustomerService, InvoiceError};

#[derive(Debug, Deserialize)]
pub struct CreateCustomerCommand {
  pub id: Option<String>,
  pub name: String,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateCustomerResponse {
  pub customer_id: String,
  pub name: String,
}

pub struct CreateCustomerUseCase {
  customer_service: Arc<CustomerService>,
}

impl CreateCustomerUseCase {
  pub fn new(customer_service: Arc<CustomerService>) -> Self {
    Self { customer_service }
  }

  pub async fn execute(
    &self,
    command: CreateCustomerCommand,
  ) -> Result<CreateCustomerResponse, InvoiceError> {
    let id = command
      .id
      .filter(|value| !value.trim().is_empty())
      .map(CustomerId::new)
      .transpose()?;
    let name = CustomerName::new(command.name)?;

    let customer = self
      .customer_service
      .create_customer(CustomerData {
        id,
        name,
        email: non_blank(command.email),
        phone: non_blank(command.phone),
        address: non_blank(command.address),
      })
      .await?;

    Ok(CreateCustomerResponse {
      customer_id: customer.id.value().to_string(),
      name: customer.name.value().to_string(),
    })
  }
}

fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}
