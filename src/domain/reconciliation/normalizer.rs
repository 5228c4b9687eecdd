//! Canonical forms of raw cell values.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::domain::invoice::entities::round_cents;

use super::table::CellValue;

/// Quantities above this are treated as a misread column, not a real delivery.
pub const DEFAULT_QUANTITY_CEILING: u32 = 100_000;

/// Trimmed display text of a cell.
pub fn canonical_text(cell: &CellValue) -> String {
  cell.as_text().trim().to_string()
}

/// Comparison form: trimmed and lowercased.
pub fn fold(text: &str) -> String {
  text.trim().to_lowercase()
}

/// Parses a billable quantity out of a cell.
///
/// Text is stripped down to `[0-9.]` and the longest `digits[.digits]` prefix of what remains
/// is parsed, so `"12.5 t."` reads as 12.5 and `"1.2.3"` as 1.2. Anything unparsable,
/// non-positive or above `ceiling` yields zero. The result is rounded to 2 decimal places.
pub fn parse_quantity(cell: &CellValue, ceiling: Decimal) -> Decimal {
  let parsed = match cell {
    CellValue::Number(value) if value.is_finite() && *value > 0.0 => {
      Decimal::from_f64_retain(*value)
    }
    CellValue::Text(text) => {
      let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
      let number = number_prefix(&digits);
      if number.is_empty() {
        None
      } else {
        Decimal::from_str(&format!("0{}", number)).ok()
      }
    }
    _ => None,
  };

  match parsed {
    Some(quantity) if quantity > ceiling => {
      tracing::debug!(%quantity, %ceiling, "Quantity exceeds ceiling, treating as zero");
      Decimal::ZERO
    }
    Some(quantity) if quantity > Decimal::ZERO => round_cents(quantity),
    _ => Decimal::ZERO,
  }
}

fn number_prefix(digits: &str) -> &str {
  let leading = |s: &str| s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
  let whole = leading(digits);
  let fraction = digits[whole..].strip_prefix('.').map(leading).unwrap_or(0);
  if fraction == 0 {
    &digits[..whole]
  } else {
    &digits[..whole + 1 + fraction]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  fn ceiling() -> Decimal {
    Decimal::from(DEFAULT_QUANTITY_CEILING)
  }

  fn text(value: &str) -> CellValue {
    CellValue::Text(value.to_string())
  }

  #[test]
  fn test_fold_and_canonical_text() {
    assert_eq!(fold("  AcmeCo "), "acmeco");
    assert_eq!(canonical_text(&text("  Not Matched\t")), "Not Matched");
    assert_eq!(canonical_text(&CellValue::Empty), "");
  }

  #[test]
  fn test_parse_quantity_extracts_digits() {
    assert_eq!(parse_quantity(&text("12 pcs"), ceiling()), dec!(12));
    assert_eq!(parse_quantity(&text("1,250.5 kg"), ceiling()), dec!(1250.5));
    assert_eq!(parse_quantity(&text("abc"), ceiling()), Decimal::ZERO);
    assert_eq!(parse_quantity(&text(""), ceiling()), Decimal::ZERO);
  }

  #[test]
  fn test_parse_quantity_reads_leading_number() {
    assert_eq!(parse_quantity(&text("1.2.3"), ceiling()), dec!(1.2));
    assert_eq!(parse_quantity(&text("12.5 t."), ceiling()), dec!(12.5));
    assert_eq!(parse_quantity(&text("7."), ceiling()), dec!(7));
    assert_eq!(parse_quantity(&text(".5"), ceiling()), dec!(0.5));
    assert_eq!(parse_quantity(&text("0"), ceiling()), Decimal::ZERO);
    assert_eq!(parse_quantity(&text("..."), ceiling()), Decimal::ZERO);
    assert_eq!(parse_quantity(&text("n/a"), ceiling()), Decimal::ZERO);
  }

  #[test]
  fn test_parse_quantity_numbers() {
    assert_eq!(parse_quantity(&CellValue::Number(10.0), ceiling()), dec!(10));
    assert_eq!(parse_quantity(&CellValue::Number(2.125), ceiling()), dec!(2.13));
    assert_eq!(parse_quantity(&CellValue::Number(-4.0), ceiling()), Decimal::ZERO);
    assert_eq!(parse_quantity(&CellValue::Number(f64::NAN), ceiling()), Decimal::ZERO);
    assert_eq!(parse_quantity(&CellValue::Bool(true), ceiling()), Decimal::ZERO);
    assert_eq!(parse_quantity(&CellValue::Empty, ceiling()), Decimal::ZERO);
  }

  #[test]
  fn test_parse_quantity_ceiling() {
    assert_eq!(parse_quantity(&text("1200000"), ceiling()), Decimal::ZERO);
    assert_eq!(parse_quantity(&CellValue::Number(100_000.5), ceiling()), Decimal::ZERO);
    assert_eq!(parse_quantity(&text("100000"), ceiling()), dec!(100000));
  }
}
