use std::sync::Arc;

use super::entities::{Customer, Invoice};
use super::errors::InvoiceError;
use super::ports::{CustomerRepository, InvoiceRepository};
use super::value_objects::{CustomerId, CustomerName};

/// Customer profile data accepted on creation
pub struct CustomerData {
  pub id: Option<CustomerId>,
  pub name: CustomerName,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub address: Option<String>,
}

pub struct CustomerService {
  customer_repo: Arc<dyn CustomerRepository>,
  invoice_repo: Arc<dyn InvoiceRepository>,
}

impl CustomerService {
  pub fn new(
    customer_repo: Arc<dyn CustomerRepository>,
    invoice_repo: Arc<dyn InvoiceRepository>,
  ) -> Self {
    Self {
      customer_repo,
      invoice_repo,
    }
  }

  pub async fn create_customer(&self, data: CustomerData) -> Result<Customer, InvoiceError> {
    let id = data.id.unwrap_or_else(CustomerId::generate);

    if self.customer_repo.find_by_id(&id).await?.is_some() {
      return Err(InvoiceError::CustomerAlreadyExists(id));
    }

    let customer = Customer::new(id, data.name, data.email, data.phone, data.address);
    let created = self.customer_repo.create(customer).await?;
    tracing::info!(customer_id = %created.id, "Customer created");
    Ok(created)
  }

  pub async fn list_customers(&self) -> Result<Vec<Customer>, InvoiceError> {
    self.customer_repo.find_all().await
  }

  pub async fn get_customer(&self, id: &CustomerId) -> Result<Customer, InvoiceError> {
    self
      .customer_repo
      .find_by_id(id)
      .await?
      .ok_or_else(|| InvoiceError::CustomerNotFound(id.clone()))
  }

  pub async fn list_customer_invoices(&self, id: &CustomerId) -> Result<Vec<Invoice>, InvoiceError> {
    let customer = self.get_customer(id).await?;
    self.invoice_repo.find_by_customer(&customer.id).await
  }
}
