use actix_web::{HttpResponse, web};
use std::sync::Arc;
use validator::Validate;

use crate::{
  adapters::http::{dtos::CreateCustomerRequest, errors::ApiError},
  application::invoice::*,
};

/// Create a customer
/// POST /api/v1/customers
pub async fn create_customer_handler(
  request: web::Json<CreateCustomerRequest>,
  use_case: web::Data<Arc<CreateCustomerUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;
  let request = request.into_inner();

  let command = CreateCustomerCommand {
    id: request.id,
    name: request.name,
    email: request.email,
    phone: request.phone,
    address: request.address,
  };

  let response = use_case.execute(command).await?;

  Ok(HttpResponse::Created().json(response))
}

/// List customers with their running totals
/// GET /api/v1/customers
pub async fn list_customers_handler(
  use_case: web::Data<Arc<ListCustomersUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let response = use_case.execute().await?;

  Ok(HttpResponse::Ok().json(response))
}

/// Invoices emitted for a customer
/// GET /api/v1/customers/{customer_id}/invoices
pub async fn list_customer_invoices_handler(
  customer_id: web::Path<String>,
  use_case: web::Data<Arc<ListCustomerInvoicesUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let command = ListCustomerInvoicesCommand {
    customer_id: customer_id.into_inner(),
  };

  let response = use_case.execute(command).await?;

  Ok(HttpResponse::Ok().json(response))
}
