use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid customer id: {0}")]
  InvalidCustomerId(String),
  #[error("Invalid customer name: {0}")]
  InvalidCustomerName(String),
  #[error("Invalid invoice number: {0}")]
  InvalidInvoiceNumber(String),
  #[error("Invalid invoice status: {0}")]
  InvalidStatus(String),
  #[error("Invalid currency code: {0}")]
  InvalidCurrency(String),
  #[error("Invalid tax rate: {0}")]
  InvalidTaxRate(String),
  #[error("Invalid product class: {0}")]
  InvalidProductClass(String),
  #[error("Invalid resolution strategy: {0}")]
  InvalidStrategy(String),
  #[error("Invalid unit rate: {0}")]
  InvalidRate(String),
}

// Customer Id - opaque identifier owned by the customer store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerId(String);

impl CustomerId {
  pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidCustomerId(
        "Customer id cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 64 {
      return Err(ValueObjectError::InvalidCustomerId(
        "Customer id cannot exceed 64 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn generate() -> Self {
    Self(Uuid::new_v4().to_string())
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

impl TryFrom<String> for CustomerId {
  type Error = ValueObjectError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::new(value)
  }
}

impl From<CustomerId> for String {
  fn from(id: CustomerId) -> Self {
    id.0
  }
}

impl fmt::Display for CustomerId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// Customer Name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerName(String);

impl CustomerName {
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidCustomerName(
        "Customer name cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 255 {
      return Err(ValueObjectError::InvalidCustomerName(
        "Customer name cannot exceed 255 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

// Invoice Number - drafts carry a placeholder until they are issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
  pub const DRAFT: &'static str = "DRAFT";

  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 100 {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot exceed 100 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn draft() -> Self {
    Self(Self::DRAFT.to_string())
  }

  pub fn is_draft(&self) -> bool {
    self.0 == Self::DRAFT
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for InvoiceNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// Invoice Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
  Draft,
  Issued,
  Paid,
  Overdue,
}

impl InvoiceStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      InvoiceStatus::Draft => "draft",
      InvoiceStatus::Issued => "issued",
      InvoiceStatus::Paid => "paid",
      InvoiceStatus::Overdue => "overdue",
    }
  }
}

impl FromStr for InvoiceStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "draft" => Ok(InvoiceStatus::Draft),
      "issued" => Ok(InvoiceStatus::Issued),
      "paid" => Ok(InvoiceStatus::Paid),
      "overdue" => Ok(InvoiceStatus::Overdue),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown status: {}",
        s
      ))),
    }
  }
}

// Currency - ISO 4217, single currency per deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Currency {
  #[default]
  QAR,
  AED,
  SAR,
  USD,
  EUR,
  GBP,
}

impl Currency {
  pub fn as_str(&self) -> &'static str {
    match self {
      Currency::QAR => "QAR",
      Currency::AED => "AED",
      Currency::SAR => "SAR",
      Currency::USD => "USD",
      Currency::EUR => "EUR",
      Currency::GBP => "GBP",
    }
  }
}

impl FromStr for Currency {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_uppercase().as_str() {
      "QAR" => Ok(Currency::QAR),
      "AED" => Ok(Currency::AED),
      "SAR" => Ok(Currency::SAR),
      "USD" => Ok(Currency::USD),
      "EUR" => Ok(Currency::EUR),
      "GBP" => Ok(Currency::GBP),
      _ => Err(ValueObjectError::InvalidCurrency(format!(
        "Unsupported currency: {}",
        s
      ))),
    }
  }
}

// Tax Rate - flat percentage applied to the invoice subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(Decimal);

impl TaxRate {
  pub fn new(percent: Decimal) -> Result<Self, ValueObjectError> {
    if percent < Decimal::ZERO || percent > Decimal::from(100) {
      return Err(ValueObjectError::InvalidTaxRate(
        "Tax rate must be between 0 and 100".to_string(),
      ));
    }
    // Max 2 decimal places
    if percent.scale() > 2 {
      return Err(ValueObjectError::InvalidTaxRate(
        "Tax rate cannot have more than 2 decimal places".to_string(),
      ));
    }
    Ok(Self(percent))
  }

  pub fn percent(&self) -> Decimal {
    self.0
  }

  pub fn as_multiplier(&self) -> Decimal {
    self.0 / Decimal::from(100)
  }
}

impl Default for TaxRate {
  fn default() -> Self {
    Self(Decimal::from(5))
  }
}

// Product Class - size tokens found in row text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductClass {
  #[serde(rename = "10mm")]
  Class10,
  #[serde(rename = "20mm")]
  Class20,
  #[serde(rename = "other")]
  Other,
}

impl ProductClass {
  pub fn as_str(&self) -> &'static str {
    match self {
      ProductClass::Class10 => "10mm",
      ProductClass::Class20 => "20mm",
      ProductClass::Other => "other",
    }
  }

  /// Whether quantities of this class count towards running totals.
  pub fn is_tracked(&self) -> bool {
    !matches!(self, ProductClass::Other)
  }
}

impl FromStr for ProductClass {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "10mm" => Ok(ProductClass::Class10),
      "20mm" => Ok(ProductClass::Class20),
      "other" => Ok(ProductClass::Other),
      _ => Err(ValueObjectError::InvalidProductClass(format!(
        "Unknown product class: {}",
        s
      ))),
    }
  }
}

impl fmt::Display for ProductClass {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
