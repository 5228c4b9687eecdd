use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::domain::invoice::{
  Customer, CustomerId, CustomerName, RunningTotals, TotalsUpdate, errors::InvoiceError,
  ports::CustomerRepository,
};

use super::rejection_reason;

#[derive(Debug, FromRow)]
struct CustomerRow {
  id: String,
  name: String,
  email: Option<String>,
  phone: Option<String>,
  address: Option<String>,
  total10: Decimal,
  total20: Decimal,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
  type Error = InvoiceError;

  fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
    Ok(Customer {
      id: CustomerId::new(row.id)?,
      name: CustomerName::new(row.name)?,
      email: row.email,
      phone: row.phone,
      address: row.address,
      totals: RunningTotals::new(row.total10, row.total20),
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

pub struct PostgresCustomerRepository {
  pool: PgPool,
}

impl PostgresCustomerRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CustomerRepository for PostgresCustomerRepository {
  async fn create(&self, customer: Customer) -> Result<Customer, InvoiceError> {
    let row = sqlx::query_as::<_, CustomerRow>(
      r#"
            INSERT INTO customers (id, name, email, phone, address, total10, total20, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, email, phone, address, total10, total20, created_at, updated_at
            "#,
    )
    .bind(customer.id.value())
    .bind(customer.name.value())
    .bind(&customer.email)
    .bind(&customer.phone)
    .bind(&customer.address)
    .bind(customer.totals.total10)
    .bind(customer.totals.total20)
    .bind(customer.created_at)
    .bind(customer.updated_at)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| match e {
      sqlx::Error::Database(ref db) if db.is_unique_violation() => {
        InvoiceError::CustomerAlreadyExists(customer.id.clone())
      }
      other => other.into(),
    })?;

    row.try_into()
  }

  async fn add_totals(
    &self,
    id: &CustomerId,
    delta: &RunningTotals,
  ) -> Result<TotalsUpdate, InvoiceError> {
    // Increment in place so concurrent runs cannot overwrite each other
    let result = sqlx::query_as::<_, CustomerRow>(
      r#"
            UPDATE customers
            SET total10 = total10 + $2, total20 = total20 + $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, phone, address, total10, total20, created_at, updated_at
            "#,
    )
    .bind(id.value())
    .bind(delta.total10)
    .bind(delta.total20)
    .fetch_optional(&self.pool)
    .await;

    match result {
      Ok(Some(row)) => Ok(TotalsUpdate::Applied(row.try_into()?)),
      Ok(None) => Ok(TotalsUpdate::Rejected(format!(
        "Customer {} does not exist",
        id
      ))),
      Err(e) => rejection_reason(e).map(TotalsUpdate::Rejected),
    }
  }

  async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, InvoiceError> {
    let row = sqlx::query_as::<_, CustomerRow>(
      r#"
            SELECT id, name, email, phone, address, total10, total20, created_at, updated_at
            FROM customers
            WHERE id = $1
            "#,
    )
    .bind(id.value())
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn find_all(&self) -> Result<Vec<Customer>, InvoiceError> {
    let rows = sqlx::query_as::<_, CustomerRow>(
      r#"
            SELECT id, name, email, phone, address, total10, total20, created_at, updated_at
            FROM customers
            ORDER BY name ASC
            "#,
    )
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }
}
