use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A single cell of an already-parsed output table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
  #[default]
  Empty,
  Bool(bool),
  Number(f64),
  Text(String),
}

impl CellValue {
  /// Display form of the cell, untrimmed.
  pub fn as_text(&self) -> Cow<'_, str> {
    match self {
      CellValue::Empty => Cow::Borrowed(""),
      CellValue::Bool(value) => Cow::Owned(value.to_string()),
      CellValue::Number(value) => Cow::Owned(value.to_string()),
      CellValue::Text(value) => Cow::Borrowed(value.as_str()),
    }
  }

  pub fn is_blank(&self) -> bool {
    self.as_text().trim().is_empty()
  }
}

impl From<&str> for CellValue {
  fn from(value: &str) -> Self {
    CellValue::Text(value.to_string())
  }
}

impl From<f64> for CellValue {
  fn from(value: f64) -> Self {
    CellValue::Number(value)
  }
}

pub type Row = Vec<CellValue>;

/// Ordered rows; the first row is the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
  rows: Vec<Row>,
}

impl Table {
  pub fn new(rows: Vec<Row>) -> Self {
    Self { rows }
  }

  pub fn header(&self) -> &[CellValue] {
    self.rows.first().map(Vec::as_slice).unwrap_or(&[])
  }

  /// Data rows paired with their 1-based position below the header.
  pub fn data_rows(&self) -> impl Iterator<Item = (usize, &Row)> {
    self
      .rows
      .iter()
      .skip(1)
      .enumerate()
      .map(|(idx, row)| (idx + 1, row))
  }

  pub fn data_row_count(&self) -> usize {
    self.rows.len().saturating_sub(1)
  }

  pub fn is_empty(&self) -> bool {
    self.data_row_count() == 0
  }
}
