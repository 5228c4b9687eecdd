use rust_decimal::Decimal;

use crate::domain::invoice::ProductClass;

use super::resolver::Rates;
use super::table::CellValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
  pub class: ProductClass,
  pub unit_price: Decimal,
}

/// Tags a row by product class and picks its unit rate.
///
/// The description and every cell are scanned together; "20mm" is checked before "10mm",
/// so a row mentioning both is billed as 20mm.
pub fn classify(description: &str, cells: &[CellValue], rates: Rates) -> Classification {
  let scan = scan_text(description, cells);

  if scan.contains(ProductClass::Class20.as_str()) {
    Classification {
      class: ProductClass::Class20,
      unit_price: rates.rate20,
    }
  } else if scan.contains(ProductClass::Class10.as_str()) {
    Classification {
      class: ProductClass::Class10,
      unit_price: rates.rate10,
    }
  } else {
    Classification {
      class: ProductClass::Other,
      unit_price: Decimal::ZERO,
    }
  }
}

fn scan_text(description: &str, cells: &[CellValue]) -> String {
  std::iter::once(description.to_string())
    .chain(cells.iter().map(|cell| cell.as_text().into_owned()))
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}
