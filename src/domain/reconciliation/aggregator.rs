use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::domain::invoice::{
  CustomerId, InvoiceError, InvoiceLineItem, ProductClass, RunningTotals,
};

use super::classifier::classify;
use super::columns::ColumnSelection;
use super::resolver::GroupResolver;
use super::scan::scan_rows;
use super::table::Table;

/// Line items and running-total delta collected for one customer during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerAccumulation {
  pub customer_id: CustomerId,
  pub items: Vec<InvoiceLineItem>,
  pub delta: RunningTotals,
}

impl CustomerAccumulation {
  fn new(customer_id: CustomerId) -> Self {
    Self {
      customer_id,
      items: Vec::new(),
      delta: RunningTotals::default(),
    }
  }

  fn push(&mut self, item: InvoiceLineItem) {
    self.delta.record(item.product_class, item.quantity);
    self.items.push(item);
  }
}

/// Per-customer accumulations in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
  customers: IndexMap<CustomerId, CustomerAccumulation>,
  rows_scanned: usize,
  rows_resolved: usize,
}

impl Aggregation {
  pub fn record(&mut self, customer_id: &CustomerId, item: InvoiceLineItem) {
    self.rows_resolved += 1;
    self
      .customers
      .entry(customer_id.clone())
      .or_insert_with(|| CustomerAccumulation::new(customer_id.clone()))
      .push(item);
  }

  pub fn get(&self, customer_id: &CustomerId) -> Option<&CustomerAccumulation> {
    self.customers.get(customer_id)
  }

  pub fn customers(&self) -> impl Iterator<Item = &CustomerAccumulation> {
    self.customers.values()
  }

  pub fn customer_count(&self) -> usize {
    self.customers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.customers.is_empty()
  }

  pub fn rows_scanned(&self) -> usize {
    self.rows_scanned
  }

  pub fn rows_resolved(&self) -> usize {
    self.rows_resolved
  }
}

/// Resolves, classifies and accumulates every data row of `table`.
///
/// Fails only when a line amount does not fit a `Decimal`.
pub fn aggregate(
  table: &Table,
  columns: ColumnSelection,
  resolver: &GroupResolver<'_>,
  quantity_ceiling: Decimal,
) -> Result<Aggregation, InvoiceError> {
  let mut aggregation = Aggregation::default();

  for row in scan_rows(table, columns, quantity_ceiling) {
    aggregation.rows_scanned += 1;

    let Some(resolved) = resolver.resolve(&row.result) else {
      tracing::debug!(row = row.number, result = %row.result, "Row dropped: no billable group");
      continue;
    };

    let classification = classify(&row.description, row.cells, resolved.rates);
    let item = InvoiceLineItem::new(
      row.description,
      row.quantity,
      classification.unit_price,
      classification.class,
    )?;
    aggregation.record(&resolved.customer_id, item);
  }

  tracing::debug!(
    rows = aggregation.rows_scanned,
    resolved = aggregation.rows_resolved,
    customers = aggregation.customer_count(),
    "Rows aggregated"
  );

  Ok(aggregation)
}

/// Merges items sharing description, unit price and class, keeping first-seen order.
pub fn consolidate(items: Vec<InvoiceLineItem>) -> Result<Vec<InvoiceLineItem>, InvoiceError> {
  let mut merged: IndexMap<(String, Decimal, ProductClass), InvoiceLineItem> = IndexMap::new();

  for item in items {
    let key = (item.description.clone(), item.unit_price, item.product_class);
    match merged.get_mut(&key) {
      Some(existing) => existing.absorb(item.quantity)?,
      None => {
        merged.insert(key, item);
      }
    }
  }

  Ok(merged.into_values().collect())
}
