use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::invoice::entities::round_cents;
use crate::domain::invoice::{CustomerId, ProductClass};

use super::classifier::classify;
use super::columns::ColumnSelection;
use super::resolver::{GroupConfigurations, GroupLookup, GroupResolver, Rates};
use super::scan::scan_rows;
use super::table::Table;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
  pub group_key: String,
  pub customer_id: Option<CustomerId>,
  pub row_count: usize,
  pub total_quantity: Decimal,
  pub total10: Decimal,
  pub total20: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerStats {
  pub customer_id: CustomerId,
  pub total10: Decimal,
  pub total20: Decimal,
  pub trips10: usize,
  pub trips20: usize,
}

/// Side-effect free summary of how the rows of a table reconcile against the groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciliationStats {
  pub total_rows: usize,
  pub matched_rows: usize,
  /// Rows explicitly marked as not matched (or blank).
  pub unmatched_count: usize,
  /// Rows with a result that no group label recognised.
  pub unresolved_count: usize,
  pub match_percentage: Decimal,
  pub total_quantity: Decimal,
  pub total10: Decimal,
  pub total20: Decimal,
  pub groups: Vec<GroupStats>,
  pub customers: Vec<CustomerStats>,
}

/// Tallies rows per group and per assigned customer. Every configured group is listed, in
/// configuration order, even when no row landed in it.
pub fn summarize(
  table: &Table,
  columns: ColumnSelection,
  groups: &GroupConfigurations,
  resolver: &GroupResolver<'_>,
  quantity_ceiling: Decimal,
) -> ReconciliationStats {
  let mut stats = ReconciliationStats::default();
  let mut per_group: IndexMap<&str, GroupStats> = groups
    .iter()
    .map(|(key, config)| {
      (
        key.as_str(),
        GroupStats {
          group_key: key.clone(),
          customer_id: config.customer_id.clone(),
          row_count: 0,
          total_quantity: Decimal::ZERO,
          total10: Decimal::ZERO,
          total20: Decimal::ZERO,
        },
      )
    })
    .collect();
  let mut per_customer: IndexMap<CustomerId, CustomerStats> = IndexMap::new();

  for row in scan_rows(table, columns, quantity_ceiling) {
    stats.total_rows += 1;

    let key = match resolver.lookup(&row.result) {
      GroupLookup::Unmatched => {
        stats.unmatched_count += 1;
        continue;
      }
      GroupLookup::NotFound => {
        stats.unresolved_count += 1;
        continue;
      }
      GroupLookup::Found { key, .. } => key,
    };
    stats.matched_rows += 1;

    let class = classify(&row.description, row.cells, Rates::default()).class;
    stats.total_quantity += row.quantity;
    match class {
      ProductClass::Class10 => stats.total10 += row.quantity,
      ProductClass::Class20 => stats.total20 += row.quantity,
      ProductClass::Other => {}
    }

    let Some(group) = per_group.get_mut(key) else {
      continue;
    };
    group.row_count += 1;
    group.total_quantity += row.quantity;
    match class {
      ProductClass::Class10 => group.total10 += row.quantity,
      ProductClass::Class20 => group.total20 += row.quantity,
      ProductClass::Other => {}
    }

    if let Some(customer_id) = &group.customer_id {
      let customer = per_customer
        .entry(customer_id.clone())
        .or_insert_with(|| CustomerStats {
          customer_id: customer_id.clone(),
          total10: Decimal::ZERO,
          total20: Decimal::ZERO,
          trips10: 0,
          trips20: 0,
        });
      match class {
        ProductClass::Class10 => {
          customer.total10 += row.quantity;
          customer.trips10 += 1;
        }
        ProductClass::Class20 => {
          customer.total20 += row.quantity;
          customer.trips20 += 1;
        }
        ProductClass::Other => {}
      }
    }
  }

  if stats.total_rows > 0 {
    stats.match_percentage = round_cents(
      Decimal::from(stats.matched_rows) * Decimal::ONE_HUNDRED / Decimal::from(stats.total_rows),
    );
  }
  stats.total_quantity = round_cents(stats.total_quantity);
  stats.total10 = round_cents(stats.total10);
  stats.total20 = round_cents(stats.total20);

  stats.groups = per_group
    .into_values()
    .map(|mut group| {
      group.total_quantity = round_cents(group.total_quantity);
      group.total10 = round_cents(group.total10);
      group.total20 = round_cents(group.total20);
      group
    })
    .collect();
  stats.customers = per_customer
    .into_values()
    .map(|mut customer| {
      customer.total10 = round_cents(customer.total10);
      customer.total20 = round_cents(customer.total20);
      customer
    })
    .collect();

  stats
}
