use serde::{Deserialize, Serialize};

use super::normalizer::fold;
use super::table::CellValue;

/// Column positions chosen for the output table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSelection {
  pub description: usize,
  pub quantity: Option<usize>,
  pub result: Option<usize>,
}

impl ColumnSelection {
  /// Builds a selection from raw indices where any negative value means "unset".
  pub fn from_indices(description: i64, quantity: i64, result: Option<i64>) -> Self {
    let index = |value: i64| usize::try_from(value).ok();
    Self {
      description: index(description).unwrap_or(0),
      quantity: index(quantity),
      result: result.and_then(index),
    }
  }

  /// The result column, defaulting to the last header column.
  pub fn result_column(&self, header: &[CellValue]) -> Option<usize> {
    self.result.or_else(|| header.len().checked_sub(1))
  }

  /// Fills an unset quantity column from the header, when one can be detected.
  pub fn with_detected_quantity(mut self, header: &[CellValue]) -> Self {
    if self.quantity.is_none() {
      self.quantity = detect_quantity_column(header);
    }
    self
  }
}

/// Guesses the quantity column from header names.
///
/// Preference order: a "net ... weight" header, then any "weight", "qty", "quantity".
pub fn detect_quantity_column(header: &[CellValue]) -> Option<usize> {
  let names: Vec<String> = header.iter().map(|cell| fold(&cell.as_text())).collect();
  let find = |pred: fn(&str) -> bool| names.iter().position(|name| pred(name.as_str()));

  find(|name| name.contains("net") && name.contains("weight"))
    .or_else(|| find(|name| name.contains("weight")))
    .or_else(|| find(|name| name.contains("qty")))
    .or_else(|| find(|name| name.contains("quantity")))
}
