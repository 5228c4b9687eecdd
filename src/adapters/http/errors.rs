use actix_web::{
  HttpResponse,
  error::ResponseError,
  http::{StatusCode, header::ContentType},
};
use serde::Serialize;
use std::fmt;

use crate::domain::invoice::{InvoiceError, ValueObjectError};
use crate::domain::reconciliation::{ReconciliationError, StatusMessage};

use super::dtos::ErrorResponse;

/// API error type that maps domain errors to HTTP responses
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum ApiError {
  /// Validation error (400 Bad Request)
  Validation(String),

  /// Missing resource (404 Not Found)
  NotFound(String),

  /// Duplicate resource (409 Conflict)
  Conflict(String),

  /// Run cannot start with the given configuration (422 Unprocessable Entity)
  Configuration(String),

  /// Internal server error (500 Internal Server Error)
  Internal(String),
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
      ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
      ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
      ApiError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
      ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
    }
  }
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Configuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    let (error_type, message) = match self {
      ApiError::Validation(msg) => ("validation_error", msg.clone()),
      ApiError::NotFound(msg) => ("not_found", msg.clone()),
      ApiError::Conflict(msg) => ("conflict", msg.clone()),
      ApiError::Configuration(msg) => ("configuration_error", msg.clone()),
      ApiError::Internal(msg) => {
        // Don't expose internal error details in production
        tracing::error!("Internal error: {}", msg);
        ("internal_error", "An internal server error occurred".to_string())
      }
    };

    let error_response = ErrorResponse {
      error: error_type.to_string(),
      message,
      details: None,
    };

    HttpResponse::build(status)
      .content_type(ContentType::json())
      .json(error_response)
  }
}

impl From<ValueObjectError> for ApiError {
  fn from(error: ValueObjectError) -> Self {
    ApiError::Validation(error.to_string())
  }
}

/// Convert InvoiceError to ApiError
impl From<InvoiceError> for ApiError {
  fn from(error: InvoiceError) -> Self {
    match error {
      InvoiceError::Validation(e) => ApiError::Validation(e.to_string()),
      InvoiceError::NoLineItems | InvoiceError::AmountOverflow(_) => {
        ApiError::Validation(error.to_string())
      }
      InvoiceError::CustomerNotFound(id) => {
        ApiError::NotFound(format!("Customer {} not found", id))
      }
      InvoiceError::CustomerAlreadyExists(id) => {
        ApiError::Conflict(format!("Customer {} already exists", id))
      }
      InvoiceError::Repository(_) | InvoiceError::Database(_) => {
        ApiError::Internal(error.to_string())
      }
    }
  }
}

/// Convert ReconciliationError to ApiError, using the status text the run reported
impl From<ReconciliationError> for ApiError {
  fn from(error: ReconciliationError) -> Self {
    match error {
      ReconciliationError::MissingOutputConfiguration => {
        ApiError::Configuration(StatusMessage::MissingOutputConfiguration.to_string())
      }
      ReconciliationError::NoCustomerAssigned => {
        ApiError::Configuration(StatusMessage::NoCustomerAssigned.to_string())
      }
      ReconciliationError::Validation(msg) => ApiError::Validation(msg),
      ReconciliationError::Store(e @ InvoiceError::AmountOverflow(_)) => {
        ApiError::Validation(e.to_string())
      }
      ReconciliationError::Store(e) => ApiError::Internal(format!(
        "{} ({})",
        StatusMessage::GenerationError,
        e
      )),
    }
  }
}

/// Convert validation errors from validator crate
impl From<validator::ValidationErrors> for ApiError {
  fn from(errors: validator::ValidationErrors) -> Self {
    let messages: Vec<String> = errors
      .field_errors()
      .iter()
      .flat_map(|(field, errors)| {
        errors
          .iter()
          .map(|error| {
            error
              .message
              .as_ref()
              .map(|m| m.to_string())
              .unwrap_or_else(|| format!("Invalid field: {}", field))
          })
          .collect::<Vec<_>>()
      })
      .collect();

    ApiError::Validation(messages.join(", "))
  }
}
