use rust_decimal::Decimal;

use super::columns::ColumnSelection;
use super::normalizer::{canonical_text, parse_quantity};
use super::table::{CellValue, Table};

/// A data row with its selected columns already normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedRow<'t> {
  /// 1-based position below the header.
  pub number: usize,
  pub description: String,
  pub quantity: Decimal,
  pub result: String,
  pub cells: &'t [CellValue],
}

/// Walks the data rows of `table`, header excluded.
pub fn scan_rows<'t>(
  table: &'t Table,
  columns: ColumnSelection,
  ceiling: Decimal,
) -> impl Iterator<Item = ScannedRow<'t>> + 't {
  let result_column = columns.result_column(table.header());

  table.data_rows().map(move |(number, row)| {
    let cell = |index: Option<usize>| index.and_then(|idx| row.get(idx));

    let description = cell(Some(columns.description))
      .map(canonical_text)
      .filter(|text| !text.is_empty())
      .unwrap_or_else(|| format!("Item {}", number));

    let quantity = cell(columns.quantity)
      .map(|value| parse_quantity(value, ceiling))
      .unwrap_or(Decimal::ZERO);

    let result = cell(result_column).map(canonical_text).unwrap_or_default();

    ScannedRow {
      number,
      description,
      quantity,
      result,
      cells: row.as_slice(),
    }
  })
}
