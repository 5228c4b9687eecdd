use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::{
  CustomerId, CustomerService, Invoice, InvoiceError, InvoiceLineItem, Party, ProductClass,
};

#[derive(Debug, Deserialize)]
pub struct ListCustomerInvoicesCommand {
  pub customer_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartyDto {
  pub customer_id: Option<String>,
  pub name: String,
  pub address: String,
  pub email: String,
  pub phone: String,
}

impl From<&Party> for PartyDto {
  fn from(party: &Party) -> Self {
    Self {
      customer_id: party.customer_id.as_ref().map(|id| id.value().to_string()),
      name: party.name.clone(),
      address: party.address.clone(),
      email: party.email.clone(),
      phone: party.phone.clone(),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceLineItemDto {
  pub id: Uuid,
  pub description: String,
  pub quantity: Decimal,
  pub unit_price: Decimal,
  pub amount: Decimal,
  #[serde(rename = "type")]
  pub product_class: ProductClass,
}

impl From<&InvoiceLineItem> for InvoiceLineItemDto {
  fn from(item: &InvoiceLineItem) -> Self {
    Self {
      id: item.id,
      description: item.description.clone(),
      quantity: item.quantity,
      unit_price: item.unit_price,
      amount: item.amount,
      product_class: item.product_class,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDto {
  pub id: Uuid,
  pub number: String,
  pub date: NaiveDate,
  pub status: String,
  pub from: PartyDto,
  pub to: PartyDto,
  pub items: Vec<InvoiceLineItemDto>,
  pub subtotal: Decimal,
  pub tax: Decimal,
  pub total: Decimal,
  pub currency: String,
  pub notes: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl From<&Invoice> for InvoiceDto {
  fn from(invoice: &Invoice) -> Self {
    Self {
      id: invoice.id,
      number: invoice.number.value().to_string(),
      date: invoice.date,
      status: invoice.status.as_str().to_string(),
      from: PartyDto::from(&invoice.from),
      to: PartyDto::from(&invoice.to),
      items: invoice.items.iter().map(InvoiceLineItemDto::from).collect(),
      subtotal: invoice.subtotal,
      tax: invoice.tax,
      total: invoice.total,
      currency: invoice.currency.as_str().to_string(),
      notes: invoice.notes.clone(),
      created_at: invoice.created_at,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ListCustomerInvoicesResponse {
  pub customer_id: String,
  pub invoices: Vec<InvoiceDto>,
}

pub struct ListCustomerInvoicesUseCase {
  customer_service: Arc<CustomerService>,
}

impl ListCustomerInvoicesUseCase {
  pub fn new(customer_service: Arc<CustomerService>) -> Self {
    Self { customer_service }
  }

  pub async fn execute(
    &self,
    command: ListCustomerInvoicesCommand,
  ) -> Result<ListCustomerInvoicesResponse, InvoiceError> {
    let customer_id = CustomerId::new(command.customer_id)?;
    let invoices = self
      .customer_service
      .list_customer_invoices(&customer_id)
      .await?;

    Ok(ListCustomerInvoicesResponse {
      customer_id: customer_id.value().to_string(),
      invoices: invoices.iter().map(InvoiceDto::from).collect(),
    })
  }
}
