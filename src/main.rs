use actix_web::{App, HttpServer, middleware::Logger, web};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reconbill::{
  adapters::http::{configure_customer_routes, configure_reconciliation_routes, health_handler},
  application::invoice::{
    CreateCustomerUseCase, ListCustomerInvoicesUseCase, ListCustomersUseCase,
  },
  application::reconciliation::{
    GenerateInvoicesUseCase, SuggestCustomersUseCase, SummarizeReconciliationUseCase,
  },
  domain::invoice::{CustomerRepository, CustomerService, InvoiceRepository},
  domain::reconciliation::ReconciliationService,
  infrastructure::{
    config::{Config, DatabaseBackend, DatabaseConfig},
    persistence::memory::{InMemoryCustomerRepository, InMemoryInvoiceRepository},
    persistence::postgres::{PostgresCustomerRepository, PostgresInvoiceRepository},
  },
};

type Repositories = (Arc<dyn CustomerRepository>, Arc<dyn InvoiceRepository>);

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  // Initialize tracing subscriber for logging
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "reconbill=debug,actix_web=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting reconbill");

  // Load configuration
  let config = Config::load().expect("Failed to load configuration");
  tracing::info!("Configuration loaded successfully");

  let (customer_repo, invoice_repo) = match config.database.backend {
    DatabaseBackend::Postgres => connect_postgres(&config.database).await?,
    DatabaseBackend::Memory => {
      tracing::warn!("Using in-memory store, data is lost on shutdown");
      let repos: Repositories = (
        Arc::new(InMemoryCustomerRepository::new()),
        Arc::new(InMemoryInvoiceRepository::new()),
      );
      repos
    }
  };

  let billing_profile = config.billing.profile().map_err(|e| {
    tracing::error!("Invalid billing configuration: {}", e);
    std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
  })?;

  // Initialize domain services
  let customer_service = Arc::new(CustomerService::new(
    customer_repo.clone(),
    invoice_repo.clone(),
  ));
  let reconciliation_service = Arc::new(ReconciliationService::new(
    customer_repo,
    invoice_repo,
    config.reconciliation_settings(),
    billing_profile,
  ));

  // Initialize customer use cases
  let create_customer_use_case = Arc::new(CreateCustomerUseCase::new(customer_service.clone()));
  let list_customers_use_case = Arc::new(ListCustomersUseCase::new(customer_service.clone()));
  let list_customer_invoices_use_case =
    Arc::new(ListCustomerInvoicesUseCase::new(customer_service.clone()));

  // Initialize reconciliation use cases
  let generate_invoices_use_case =
    Arc::new(GenerateInvoicesUseCase::new(reconciliation_service.clone()));
  let summarize_use_case = Arc::new(SummarizeReconciliationUseCase::new(
    reconciliation_service.clone(),
  ));
  let suggest_customers_use_case =
    Arc::new(SuggestCustomersUseCase::new(reconciliation_service.clone()));

  let server_host = config.server.host.clone();
  let server_port = config.server.port;

  tracing::info!("Starting HTTP server on {}:{}", server_host, server_port);

  HttpServer::new(move || {
    App::new()
      .wrap(Logger::default())
      .service(web::scope("/api/v1/reconciliation").configure(|cfg| {
        configure_reconciliation_routes(
          cfg,
          generate_invoices_use_case.clone(),
          summarize_use_case.clone(),
          suggest_customers_use_case.clone(),
        )
      }))
      .service(web::scope("/api/v1/customers").configure(|cfg| {
        configure_customer_routes(
          cfg,
          create_customer_use_case.clone(),
          list_customers_use_case.clone(),
          list_customer_invoices_use_case.clone(),
        )
      }))
      .route("/health", web::get().to(health_handler))
  })
  .bind((server_host.as_str(), server_port))?
  .run()
  .await
}

/// Opens the pool, runs migrations and builds the Postgres repositories.
async fn connect_postgres(database: &DatabaseConfig) -> std::io::Result<Repositories> {
  tracing::info!("Connecting to database: {}", database.url);

  let db_pool = tokio::time::timeout(
    Duration::from_secs(database.connect_timeout_seconds),
    PgPoolOptions::new()
      .max_connections(database.max_connections)
      .acquire_timeout(Duration::from_secs(database.acquire_timeout_seconds))
      .connect(&database.url),
  )
  .await
  .map_err(|_| {
    tracing::error!(
      "Database connection timed out after {} seconds. Is PostgreSQL running?",
      database.connect_timeout_seconds
    );
    std::io::Error::new(
      std::io::ErrorKind::TimedOut,
      format!(
        "Database connection timed out after {} seconds",
        database.connect_timeout_seconds
      ),
    )
  })?
  .map_err(|e| {
    tracing::error!("Failed to connect to database: {}", e);
    match e {
      sqlx::Error::Io(_) => std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        format!(
          "Could not connect to database. Is PostgreSQL running at {}?",
          database.url
        ),
      ),
      _ => std::io::Error::other(format!("Database error: {}", e)),
    }
  })?;

  tracing::info!("Database connection pool created");

  tracing::info!("Running database migrations");
  sqlx::migrate!("./migrations")
    .run(&db_pool)
    .await
    .expect("Failed to run database migrations");
  tracing::info!("Database migrations completed");

  Ok((
    Arc::new(PostgresCustomerRepository::new(db_pool.clone())),
    Arc::new(PostgresInvoiceRepository::new(db_pool)),
  ))
}
