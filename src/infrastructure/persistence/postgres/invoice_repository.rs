use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::invoice::{
  Currency, CustomerId, Invoice, InvoiceLineItem, InvoiceNumber, InvoiceStatus, Party,
  ProductClass, SaveOutcome, errors::InvoiceError, ports::InvoiceRepository,
};

use super::rejection_reason;

#[derive(Debug, FromRow)]
struct InvoiceRow {
  id: Uuid,
  invoice_number: String,
  invoice_date: NaiveDate,
  status: String,
  from_party: Json<Party>,
  to_party: Json<Party>,
  subtotal: Decimal,
  tax: Decimal,
  total: Decimal,
  currency: String,
  notes: Option<String>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct LineItemRow {
  id: Uuid,
  invoice_id: Uuid,
  description: String,
  quantity: Decimal,
  unit_price: Decimal,
  amount: Decimal,
  product_class: String,
}

impl TryFrom<LineItemRow> for InvoiceLineItem {
  type Error = InvoiceError;

  fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
    Ok(InvoiceLineItem {
      id: row.id,
      description: row.description,
      quantity: row.quantity,
      unit_price: row.unit_price,
      amount: row.amount,
      product_class: ProductClass::from_str(&row.product_class)?,
    })
  }
}

impl InvoiceRow {
  fn into_invoice(self, items: Vec<InvoiceLineItem>) -> Result<Invoice, InvoiceError> {
    Ok(Invoice {
      id: self.id,
      number: InvoiceNumber::new(self.invoice_number)?,
      date: self.invoice_date,
      status: InvoiceStatus::from_str(&self.status)?,
      from: self.from_party.0,
      to: self.to_party.0,
      items,
      subtotal: self.subtotal,
      tax: self.tax,
      total: self.total,
      currency: Currency::from_str(&self.currency)?,
      notes: self.notes,
      created_at: self.created_at,
      updated_at: self.updated_at,
    })
  }
}

pub struct PostgresInvoiceRepository {
  pool: PgPool,
}

impl PostgresInvoiceRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Inserts the invoice and its line items in one transaction.
  async fn insert(&self, invoice: &Invoice, customer_id: &CustomerId) -> Result<(), sqlx::Error> {
    let mut tx = self.pool.begin().await?;

    sqlx::query(
      r#"
            INSERT INTO invoices (
                id, customer_id, invoice_number, invoice_date, status, from_party, to_party,
                subtotal, tax, total, currency, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
    )
    .bind(invoice.id)
    .bind(customer_id.value())
    .bind(invoice.number.value())
    .bind(invoice.date)
    .bind(invoice.status.as_str())
    .bind(Json(&invoice.from))
    .bind(Json(&invoice.to))
    .bind(invoice.subtotal)
    .bind(invoice.tax)
    .bind(invoice.total)
    .bind(invoice.currency.as_str())
    .bind(&invoice.notes)
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .execute(&mut *tx)
    .await?;

    for (position, item) in invoice.items.iter().enumerate() {
      sqlx::query(
        r#"
                INSERT INTO invoice_line_items (
                    id, invoice_id, line_order, description, quantity, unit_price, amount, product_class
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
      )
      .bind(item.id)
      .bind(invoice.id)
      .bind(position as i32)
      .bind(&item.description)
      .bind(item.quantity)
      .bind(item.unit_price)
      .bind(item.amount)
      .bind(item.product_class.as_str())
      .execute(&mut *tx)
      .await?;
    }

    tx.commit().await
  }
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
  async fn save(&self, invoice: &Invoice) -> Result<SaveOutcome, InvoiceError> {
    let Some(customer_id) = invoice.customer_id() else {
      return Ok(SaveOutcome::Rejected(
        "Invoice is not addressed to a customer".to_string(),
      ));
    };

    match self.insert(invoice, customer_id).await {
      Ok(()) => Ok(SaveOutcome::Saved),
      Err(e) => rejection_reason(e).map(SaveOutcome::Rejected),
    }
  }

  async fn find_by_customer(&self, customer_id: &CustomerId) -> Result<Vec<Invoice>, InvoiceError> {
    let rows = sqlx::query_as::<_, InvoiceRow>(
      r#"
            SELECT id, invoice_number, invoice_date, status, from_party, to_party,
                   subtotal, tax, total, currency, notes, created_at, updated_at
            FROM invoices
            WHERE customer_id = $1
            ORDER BY created_at ASC
            "#,
    )
    .bind(customer_id.value())
    .fetch_all(&self.pool)
    .await?;

    let invoice_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let item_rows = sqlx::query_as::<_, LineItemRow>(
      r#"
            SELECT id, invoice_id, description, quantity, unit_price, amount, product_class
            FROM invoice_line_items
            WHERE invoice_id = ANY($1)
            ORDER BY invoice_id, line_order ASC
            "#,
    )
    .bind(&invoice_ids)
    .fetch_all(&self.pool)
    .await?;

    let mut items_by_invoice: HashMap<Uuid, Vec<InvoiceLineItem>> = HashMap::new();
    for row in item_rows {
      let invoice_id = row.invoice_id;
      items_by_invoice
        .entry(invoice_id)
        .or_default()
        .push(row.try_into()?);
    }

    rows
      .into_iter()
      .map(|row| {
        let items = items_by_invoice.remove(&row.id).unwrap_or_default();
        row.into_invoice(items)
      })
      .collect()
  }
}
