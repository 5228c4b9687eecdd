use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::reconciliation::{
  ColumnSelection, GroupConfigurations, ResolutionStrategy, Table,
};

/// Request for creating a customer
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCustomerRequest {
  /// Caller-chosen identifier; generated when absent
  #[validate(length(min = 1, max = 64, message = "Customer id must be between 1 and 64 characters"))]
  pub id: Option<String>,

  #[validate(length(
    min = 1,
    max = 255,
    message = "Customer name must be between 1 and 255 characters"
  ))]
  pub name: String,

  #[validate(email(message = "Invalid email format"))]
  pub email: Option<String>,

  #[validate(length(max = 64, message = "Phone cannot exceed 64 characters"))]
  pub phone: Option<String>,

  pub address: Option<String>,
}

/// Column positions in the output table; a negative index means "not selected"
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ColumnSelectionRequest {
  pub description: Option<i64>,
  pub quantity: Option<i64>,
  pub result: Option<i64>,
}

impl From<ColumnSelectionRequest> for ColumnSelection {
  fn from(request: ColumnSelectionRequest) -> Self {
    ColumnSelection::from_indices(
      request.description.unwrap_or(0),
      request.quantity.unwrap_or(-1),
      request.result,
    )
  }
}

/// Request body shared by invoice generation and reconciliation summary
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReconciliationRequest {
  /// Output table rows, header first
  #[validate(custom(function = "validate_table"))]
  pub table: Table,

  /// Group key → billing configuration, in registration order
  #[serde(default)]
  pub groups: GroupConfigurations,

  /// Absent when no output table has been configured
  pub columns: Option<ColumnSelectionRequest>,

  pub strategy: Option<ResolutionStrategy>,

  #[validate(length(max = 255, message = "No-match label cannot exceed 255 characters"))]
  pub no_match_label: Option<String>,
}

fn validate_table(table: &Table) -> Result<(), ValidationError> {
  if table.header().is_empty() {
    let mut error = ValidationError::new("missing_header");
    error.message = Some("Table must start with a header row".into());
    return Err(error);
  }
  Ok(())
}

/// Request for customer suggestions
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionsRequest {
  pub groups: GroupConfigurations,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
  pub status: String,
  pub version: String,
}

/// Standard error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
  /// Error type/code
  pub error: String,

  /// Human-readable error message
  pub message: String,

  /// Optional detailed error information
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_create_customer_request_validation_valid() {
    let request = CreateCustomerRequest {
      id: Some("c1".to_string()),
      name: "AcmeCo".to_string(),
      email: Some("billing@acme.test".to_string()),
      phone: None,
      address: None,
    };

    assert!(request.validate().is_ok());
  }

  #[test]
  fn test_create_customer_request_validation_invalid_email() {
    let request = CreateCustomerRequest {
      id: None,
      name: "AcmeCo".to_string(),
      email: Some("not-an-email".to_string()),
      phone: None,
      address: None,
    };

    assert!(request.validate().is_err());
  }

  #[test]
  fn test_create_customer_request_validation_empty_name() {
    let request = CreateCustomerRequest {
      id: None,
      name: String::new(),
      email: None,
      phone: None,
      address: None,
    };

    assert!(request.validate().is_err());
  }

  #[test]
  fn test_reconciliation_request_parses_and_validates() {
    let json = r#"{
      "table": [["Description", "Qty", "Result"], ["10mm", 10, "AcmeCo"]],
      "groups": {"AcmeCo": {"customer_id": "c1", "rate10": 5}},
      "columns": {"description": 0, "quantity": 1},
      "strategy": "literal_value"
    }"#;
    let request: ReconciliationRequest = serde_json::from_str(json).unwrap();

    assert!(request.validate().is_ok());
    let columns = ColumnSelection::from(request.columns.unwrap());
    assert_eq!(columns.quantity, Some(1));
    assert_eq!(columns.result, None);
    assert_eq!(request.strategy, Some(ResolutionStrategy::LiteralValue));
  }

  #[test]
  fn test_reconciliation_request_requires_header() {
    let request: ReconciliationRequest = serde_json::from_str(r#"{"table": []}"#).unwrap();
    assert!(request.validate().is_err());
    assert!(request.columns.is_none());
  }

  #[test]
  fn test_column_selection_request_negative_quantity() {
    let columns = ColumnSelection::from(ColumnSelectionRequest {
      description: Some(2),
      quantity: Some(-1),
      result: Some(4),
    });
    assert_eq!(columns.description, 2);
    assert_eq!(columns.quantity, None);
    assert_eq!(columns.result, Some(4));
  }
}
