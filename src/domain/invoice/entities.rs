use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::InvoiceError;
use super::value_objects::{
  Currency, CustomerId, CustomerName, InvoiceNumber, InvoiceStatus, ProductClass, TaxRate,
};

/// Round to cents, the precision every persisted amount is kept at.
pub fn round_cents(value: Decimal) -> Decimal {
  value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// Running Totals - cumulative quantities per tracked product class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningTotals {
  pub total10: Decimal,
  pub total20: Decimal,
}

impl RunningTotals {
  pub fn new(total10: Decimal, total20: Decimal) -> Self {
    Self { total10, total20 }
  }

  /// Adds `quantity` to the bucket for `class`; `Other` is ignored.
  pub fn record(&mut self, class: ProductClass, quantity: Decimal) {
    match class {
      ProductClass::Class10 => self.total10 += quantity,
      ProductClass::Class20 => self.total20 += quantity,
      ProductClass::Other => {}
    }
  }

  pub fn plus(&self, other: &RunningTotals) -> RunningTotals {
    RunningTotals {
      total10: self.total10 + other.total10,
      total20: self.total20 + other.total20,
    }
  }

  pub fn is_zero(&self) -> bool {
    self.total10.is_zero() && self.total20.is_zero()
  }

  pub fn rounded(&self) -> RunningTotals {
    RunningTotals {
      total10: round_cents(self.total10),
      total20: round_cents(self.total20),
    }
  }
}

// Customer - billed party, owns the running totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
  pub id: CustomerId,
  pub name: CustomerName,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub address: Option<String>,
  pub totals: RunningTotals,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Customer {
  pub fn new(
    id: CustomerId,
    name: CustomerName,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
  ) -> Self {
    let now = Utc::now();
    Self {
      id,
      name,
      email,
      phone,
      address,
      totals: RunningTotals::default(),
      created_at: now,
      updated_at: now,
    }
  }

  /// Copy of this customer with `delta` added to its running totals.
  pub fn with_added_totals(&self, delta: &RunningTotals) -> Customer {
    let mut updated = self.clone();
    updated.totals = self.totals.plus(delta);
    updated.updated_at = Utc::now();
    updated
  }
}

// Party - either side of an invoice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
  pub customer_id: Option<CustomerId>,
  pub name: String,
  pub address: String,
  pub email: String,
  pub phone: String,
}

impl Party {
  pub fn for_customer(customer: &Customer) -> Self {
    Self {
      customer_id: Some(customer.id.clone()),
      name: customer.name.value().to_string(),
      address: customer.address.clone().unwrap_or_default(),
      email: customer.email.clone().unwrap_or_default(),
      phone: customer.phone.clone().unwrap_or_default(),
    }
  }
}

// Invoice Line Item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
  pub id: Uuid,
  pub description: String,
  pub quantity: Decimal,
  pub unit_price: Decimal,
  pub amount: Decimal,
  pub product_class: ProductClass,
}

impl InvoiceLineItem {
  /// Fails when `quantity * unit_price` does not fit a `Decimal`.
  pub fn new(
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    product_class: ProductClass,
  ) -> Result<Self, InvoiceError> {
    let amount = line_amount(quantity, unit_price)?;
    Ok(Self {
      id: Uuid::new_v4(),
      description,
      quantity,
      unit_price,
      amount,
      product_class,
    })
  }

  /// Adds `quantity` to this line and recomputes the amount.
  pub fn absorb(&mut self, quantity: Decimal) -> Result<(), InvoiceError> {
    let merged = self
      .quantity
      .checked_add(quantity)
      .map(round_cents)
      .ok_or_else(|| overflow("line quantity", &self.description))?;
    self.amount = line_amount(merged, self.unit_price)?;
    self.quantity = merged;
    Ok(())
  }
}

fn line_amount(quantity: Decimal, unit_price: Decimal) -> Result<Decimal, InvoiceError> {
  quantity
    .checked_mul(unit_price)
    .map(round_cents)
    .ok_or_else(|| InvoiceError::AmountOverflow(format!("{} x {}", quantity, unit_price)))
}

fn overflow(what: &str, context: &str) -> InvoiceError {
  InvoiceError::AmountOverflow(format!("{} of {}", what, context))
}

// Invoice Totals - derived from the line items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
  pub subtotal: Decimal,
  pub tax: Decimal,
  pub total: Decimal,
}

impl InvoiceTotals {
  pub fn calculate(line_items: &[InvoiceLineItem], tax_rate: TaxRate) -> Result<Self, InvoiceError> {
    let subtotal = line_items
      .iter()
      .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.amount))
      .map(round_cents)
      .ok_or_else(|| overflow("subtotal", "invoice"))?;
    let tax = subtotal
      .checked_mul(tax_rate.as_multiplier())
      .map(round_cents)
      .ok_or_else(|| overflow("tax", "invoice"))?;
    let total = subtotal
      .checked_add(tax)
      .ok_or_else(|| overflow("total", "invoice"))?;

    Ok(Self {
      subtotal,
      tax,
      total,
    })
  }
}

// Invoice - immutable once emitted by the reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
  pub id: Uuid,
  pub number: InvoiceNumber,
  pub date: NaiveDate,
  pub status: InvoiceStatus,
  pub from: Party,
  pub to: Party,
  pub items: Vec<InvoiceLineItem>,
  pub subtotal: Decimal,
  pub tax: Decimal,
  pub total: Decimal,
  pub currency: Currency,
  pub notes: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Invoice {
  /// Builds a draft invoice. Fails when `items` is empty or the totals overflow.
  pub fn draft(
    from: Party,
    to: Party,
    items: Vec<InvoiceLineItem>,
    currency: Currency,
    tax_rate: TaxRate,
    notes: Option<String>,
  ) -> Result<Self, InvoiceError> {
    if items.is_empty() {
      return Err(InvoiceError::NoLineItems);
    }

    let totals = InvoiceTotals::calculate(&items, tax_rate)?;
    let now = Utc::now();

    Ok(Self {
      id: Uuid::new_v4(),
      number: InvoiceNumber::draft(),
      date: now.date_naive(),
      status: InvoiceStatus::Draft,
      from,
      to,
      items,
      subtotal: totals.subtotal,
      tax: totals.tax,
      total: totals.total,
      currency,
      notes,
      created_at: now,
      updated_at: now,
    })
  }

  pub fn customer_id(&self) -> Option<&CustomerId> {
    self.to.customer_id.as_ref()
  }

  pub fn totals(&self) -> InvoiceTotals {
    InvoiceTotals {
      subtotal: self.subtotal,
      tax: self.tax,
      total: self.total,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  fn customer() -> Customer {
    Customer::new(
      CustomerId::new("c1").unwrap(),
      CustomerName::new("AcmeCo".to_string()).unwrap(),
      Some("billing@acme.test".to_string()),
      None,
      Some("1 Quarry Rd".to_string()),
    )
  }

  #[test]
  fn test_running_totals_record_ignores_other() {
    let mut totals = RunningTotals::default();
    totals.record(ProductClass::Class10, dec!(3));
    totals.record(ProductClass::Class20, dec!(4.5));
    totals.record(ProductClass::Other, dec!(100));
    assert_eq!(totals, RunningTotals::new(dec!(3), dec!(4.5)));
    assert!(!totals.is_zero());
    assert!(RunningTotals::default().is_zero());
  }

  #[test]
  fn test_customer_totals_are_additive() {
    let mut customer = customer();
    customer.totals = RunningTotals::new(dec!(10), dec!(20));
    let delta = RunningTotals::new(dec!(5), dec!(0));

    let once = customer.with_added_totals(&delta);
    let twice = once.with_added_totals(&delta);

    assert_eq!(once.totals, RunningTotals::new(dec!(15), dec!(20)));
    assert_eq!(twice.totals, RunningTotals::new(dec!(20), dec!(20)));
    assert_eq!(customer.totals, RunningTotals::new(dec!(10), dec!(20)));
  }

  #[test]
  fn test_line_item_amount() {
    let item =
      InvoiceLineItem::new("10mm pipe".to_string(), dec!(10), dec!(5), ProductClass::Class10)
        .unwrap();
    assert_eq!(item.amount, dec!(50));

    let item = InvoiceLineItem::new("odd".to_string(), dec!(1.333), dec!(3), ProductClass::Other)
      .unwrap();
    assert_eq!(item.amount, dec!(4.00));
  }

  #[test]
  fn test_line_item_amount_overflow_is_an_error() {
    let result = InvoiceLineItem::new(
      "10mm".to_string(),
      dec!(50000),
      Decimal::from_str_exact("10000000000000000000000000").unwrap(),
      ProductClass::Class10,
    );
    assert!(matches!(result, Err(InvoiceError::AmountOverflow(_))));
  }

  #[test]
  fn test_invoice_totals_overflow_is_an_error() {
    let huge = InvoiceLineItem::new("10mm".to_string(), dec!(1), Decimal::MAX, ProductClass::Class10)
      .unwrap();
    let result = InvoiceTotals::calculate(&[huge.clone(), huge], TaxRate::default());
    assert!(matches!(result, Err(InvoiceError::AmountOverflow(_))));
  }

  #[test]
  fn test_round_cents_midpoint_goes_up() {
    assert_eq!(round_cents(dec!(0.125)), dec!(0.13));
    assert_eq!(round_cents(dec!(2.5)), dec!(2.5));
  }

  #[test]
  fn test_line_item_absorb() {
    let mut item =
      InvoiceLineItem::new("20mm".to_string(), dec!(2), dec!(7.5), ProductClass::Class20).unwrap();
    item.absorb(dec!(3)).unwrap();
    assert_eq!(item.quantity, dec!(5));
    assert_eq!(item.amount, dec!(37.5));
  }

  #[test]
  fn test_invoice_draft_totals() {
    let items = vec![InvoiceLineItem::new(
      "10mm pipe".to_string(),
      dec!(10),
      dec!(5),
      ProductClass::Class10,
    )
    .unwrap()];
    let invoice = Invoice::draft(
      Party::default(),
      Party::for_customer(&customer()),
      items,
      Currency::QAR,
      TaxRate::default(),
      None,
    )
    .unwrap();

    assert_eq!(invoice.status, InvoiceStatus::Draft);
    assert!(invoice.number.is_draft());
    assert_eq!(invoice.subtotal, dec!(50));
    assert_eq!(invoice.tax, dec!(2.5));
    assert_eq!(invoice.total, dec!(52.5));
    assert_eq!(invoice.customer_id().unwrap().value(), "c1");
    assert_eq!(invoice.to.address, "1 Quarry Rd");
  }

  #[test]
  fn test_invoice_draft_requires_items() {
    let result = Invoice::draft(
      Party::default(),
      Party::for_customer(&customer()),
      Vec::new(),
      Currency::QAR,
      TaxRate::default(),
      None,
    );
    assert!(matches!(result, Err(InvoiceError::NoLineItems)));
  }
}
