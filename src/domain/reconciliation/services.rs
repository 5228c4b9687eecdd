use rust_decimal::Decimal;
use std::sync::Arc;

use crate::domain::invoice::{Customer, CustomerRepository, InvoiceRepository};

use super::aggregator::{aggregate, Aggregation};
use super::columns::ColumnSelection;
use super::emitter::{plan, BillingProfile, EmissionReport, InvoiceEmitter, RunOutcome};
use super::errors::ReconciliationError;
use super::normalizer::DEFAULT_QUANTITY_CEILING;
use super::reporting::{StatusMessage, StatusReporter};
use super::resolver::{has_assigned_customer, GroupConfigurations, GroupResolver, ResolutionStrategy};
use super::stats::{summarize, ReconciliationStats};
use super::suggest::suggest_customer;
use super::table::Table;

/// Matching knobs shared by every run of a service instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationSettings {
  pub strategy: ResolutionStrategy,
  pub no_match_label: String,
  pub quantity_ceiling: Decimal,
  pub auto_detect_quantity_column: bool,
}

impl Default for ReconciliationSettings {
  fn default() -> Self {
    Self {
      strategy: ResolutionStrategy::LiteralValue,
      no_match_label: "Not Matched".to_string(),
      quantity_ceiling: Decimal::from(DEFAULT_QUANTITY_CEILING),
      auto_detect_quantity_column: false,
    }
  }
}

/// Inputs of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationRun {
  pub table: Table,
  pub groups: GroupConfigurations,
  /// `None` when the output table was never configured.
  pub columns: Option<ColumnSelection>,
  pub strategy: Option<ResolutionStrategy>,
  pub no_match_label: Option<String>,
}

/// A group label and the customer it most likely belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerSuggestion {
  pub group_key: String,
  pub customer: Option<Customer>,
}

pub struct ReconciliationService {
  customer_repo: Arc<dyn CustomerRepository>,
  emitter: InvoiceEmitter,
  settings: ReconciliationSettings,
  profile: BillingProfile,
}

impl ReconciliationService {
  pub fn new(
    customer_repo: Arc<dyn CustomerRepository>,
    invoice_repo: Arc<dyn InvoiceRepository>,
    settings: ReconciliationSettings,
    profile: BillingProfile,
  ) -> Self {
    Self {
      emitter: InvoiceEmitter::new(customer_repo.clone(), invoice_repo),
      customer_repo,
      settings,
      profile,
    }
  }

  pub fn settings(&self) -> &ReconciliationSettings {
    &self.settings
  }

  fn resolver<'a>(&self, run: &'a ReconciliationRun) -> GroupResolver<'a> {
    GroupResolver::new(
      &run.groups,
      run.strategy.unwrap_or(self.settings.strategy),
      run
        .no_match_label
        .as_deref()
        .unwrap_or(&self.settings.no_match_label),
    )
  }

  /// Resolves and accumulates the rows of a run. Pure; touches no store.
  pub fn aggregate(
    &self,
    run: &ReconciliationRun,
    columns: ColumnSelection,
  ) -> Result<Aggregation, ReconciliationError> {
    validate_groups(&run.groups)?;
    let resolver = self.resolver(run);
    aggregate(&run.table, columns, &resolver, self.settings.quantity_ceiling)
      .map_err(|e| ReconciliationError::Validation(e.to_string()))
  }

  /// Reconciliation statistics for a run. An unset quantity column is detected from the header.
  pub fn summarize(
    &self,
    run: &ReconciliationRun,
  ) -> Result<ReconciliationStats, ReconciliationError> {
    let columns = run
      .columns
      .ok_or(ReconciliationError::MissingOutputConfiguration)?
      .with_detected_quantity(run.table.header());
    validate_groups(&run.groups)?;
    let resolver = self.resolver(run);

    Ok(summarize(
      &run.table,
      columns,
      &run.groups,
      &resolver,
      self.settings.quantity_ceiling,
    ))
  }

  /// Generates one draft invoice per resolved customer and persists it with the customer's
  /// updated running totals. Every terminal state is also announced through `reporter`.
  pub async fn generate_invoices(
    &self,
    run: &ReconciliationRun,
    reporter: &dyn StatusReporter,
  ) -> Result<EmissionReport, ReconciliationError> {
    let Some(mut columns) = run.columns else {
      reporter.report(StatusMessage::MissingOutputConfiguration);
      return Err(ReconciliationError::MissingOutputConfiguration);
    };

    if !has_assigned_customer(&run.groups) {
      reporter.report(StatusMessage::NoCustomerAssigned);
      return Err(ReconciliationError::NoCustomerAssigned);
    }

    if self.settings.auto_detect_quantity_column {
      columns = columns.with_detected_quantity(run.table.header());
    }
    if columns.quantity.is_none() {
      reporter.report(StatusMessage::QuantityColumnNotSelected);
    }

    let aggregation = match self.aggregate(run, columns) {
      Ok(aggregation) => aggregation,
      Err(e) => {
        tracing::warn!("Invoice generation refused: {}", e);
        reporter.report(StatusMessage::GenerationError);
        return Err(e);
      }
    };
    if aggregation.is_empty() {
      tracing::info!(rows = aggregation.rows_scanned(), "No rows resolved to a customer");
      reporter.report(StatusMessage::NoMatchingRows);
      return Ok(EmissionReport::default());
    }

    let report = match self.persist(&aggregation).await {
      Ok(report) => report,
      Err(e) => {
        tracing::error!("Invoice generation aborted: {}", e);
        reporter.report(StatusMessage::GenerationError);
        return Err(e);
      }
    };

    match report.outcome() {
      RunOutcome::Generated(count) => {
        reporter.report(StatusMessage::InvoicesGenerated(count));
        if report.fail_count > 0 {
          reporter.report(StatusMessage::InvoicesNotSaved(report.fail_count));
        }
      }
      RunOutcome::Failed => reporter.report(StatusMessage::GenerationFailed),
      RunOutcome::NothingToDo => reporter.report(StatusMessage::NoMatchingRows),
    }

    Ok(report)
  }

  async fn persist(&self, aggregation: &Aggregation) -> Result<EmissionReport, ReconciliationError> {
    let customers = self.customer_repo.find_all().await?;
    let plan = plan(aggregation, &customers, &self.profile)?;
    if plan.is_empty() {
      return Ok(EmissionReport {
        skipped_customers: plan.skipped_customers,
        ..EmissionReport::default()
      });
    }
    Ok(self.emitter.emit(plan).await?)
  }

  /// Suggests a customer for every group that has none assigned yet.
  pub async fn suggest_customers(
    &self,
    groups: &GroupConfigurations,
  ) -> Result<Vec<CustomerSuggestion>, ReconciliationError> {
    let customers = self.customer_repo.find_all().await?;

    Ok(
      groups
        .iter()
        .filter(|(_, config)| !config.is_complete())
        .map(|(key, config)| {
          let label = config.display_name.as_deref().unwrap_or(key);
          CustomerSuggestion {
            group_key: key.clone(),
            customer: suggest_customer(label, &customers).cloned(),
          }
        })
        .collect(),
    )
  }
}

/// Rates built in code skip the deserializer checks, so every run re-validates them.
fn validate_groups(groups: &GroupConfigurations) -> Result<(), ReconciliationError> {
  for (key, config) in groups {
    config
      .validate()
      .map_err(|e| ReconciliationError::Validation(format!("Group {}: {}", key, e)))?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::invoice::{
    CustomerId, CustomerName, InvoiceError, InvoiceStatus, ProductClass, RunningTotals,
    TotalsUpdate,
  };
  use crate::domain::reconciliation::resolver::GroupConfig;
  use crate::infrastructure::persistence::memory::{
    InMemoryCustomerRepository, InMemoryInvoiceRepository,
  };
  use crate::infrastructure::reporting::BufferedStatusReporter;
  use rust_decimal_macros::dec;

  fn id(value: &str) -> CustomerId {
    CustomerId::new(value).unwrap()
  }

  fn customer(value: &str, name: &str) -> Customer {
    Customer::new(id(value), CustomerName::new(name.to_string()).unwrap(), None, None, None)
  }

  struct Harness {
    customers: Arc<InMemoryCustomerRepository>,
    invoices: Arc<InMemoryInvoiceRepository>,
    service: ReconciliationService,
    reporter: BufferedStatusReporter,
  }

  fn harness_with(
    customers: InMemoryCustomerRepository,
    invoices: InMemoryInvoiceRepository,
  ) -> Harness {
    let customers = Arc::new(customers);
    let invoices = Arc::new(invoices);
    let service = ReconciliationService::new(
      customers.clone(),
      invoices.clone(),
      ReconciliationSettings::default(),
      BillingProfile::default(),
    );
    Harness {
      customers,
      invoices,
      service,
      reporter: BufferedStatusReporter::default(),
    }
  }

  fn harness() -> Harness {
    harness_with(
      InMemoryCustomerRepository::with_customers(vec![customer("c1", "AcmeCo")]),
      InMemoryInvoiceRepository::new(),
    )
  }

  fn acme_groups() -> GroupConfigurations {
    let mut groups = GroupConfigurations::new();
    groups.insert(
      "AcmeCo".to_string(),
      GroupConfig::for_customer(id("c1")).with_rates(Some(dec!(5)), None),
    );
    groups
  }

  fn run(rows: &str, groups: GroupConfigurations) -> ReconciliationRun {
    ReconciliationRun {
      table: serde_json::from_str(rows).unwrap(),
      groups,
      columns: Some(ColumnSelection::from_indices(0, 1, Some(2))),
      ..ReconciliationRun::default()
    }
  }

  #[tokio::test]
  async fn test_single_customer_invoice() {
    let h = harness();
    let run = run(
      r#"[["D","Q","R"],["10mm pipe", 10, "AcmeCo"],["10mm pipe", 10, "not matched"]]"#,
      acme_groups(),
    );

    let report = h.service.generate_invoices(&run, &h.reporter).await.unwrap();

    assert_eq!(report.outcome(), RunOutcome::Generated(1));
    assert_eq!(report.invoices.len(), 1);
    assert_eq!(report.customer_updates.len(), 1);
    assert!(report.skipped_customers.is_empty());
    let invoice = &report.invoices[0];
    assert_eq!(invoice.customer_id(), Some(&id("c1")));
    assert_eq!(invoice.items.len(), 1);
    assert_eq!(invoice.items[0].description, "10mm pipe");
    assert_eq!(invoice.items[0].quantity, dec!(10));
    assert_eq!(invoice.items[0].amount, dec!(50));
    assert_eq!(invoice.items[0].product_class, ProductClass::Class10);
    assert_eq!(invoice.subtotal, dec!(50));
    assert_eq!(invoice.tax, dec!(2.5));
    assert_eq!(invoice.total, dec!(52.5));
    assert_eq!(invoice.status, InvoiceStatus::Draft);
    assert_eq!(invoice.number.value(), "DRAFT");

    // the unmatched row adds nothing to the stored totals
    let stored = h.customers.find_by_id(&id("c1")).await.unwrap().unwrap();
    assert_eq!(stored.totals, RunningTotals::new(dec!(10), dec!(0)));
    assert_eq!(h.invoices.save_calls(), 1);
    assert_eq!(
      h.reporter.rendered(),
      vec!["1 invoice(s) generated successfully!".to_string()]
    );
  }

  #[tokio::test]
  async fn test_out_of_range_rate_is_refused() {
    let h = harness();
    let mut groups = GroupConfigurations::new();
    groups.insert(
      "AcmeCo".to_string(),
      GroupConfig::for_customer(id("c1")).with_rates(Some(Decimal::MAX), None),
    );
    let run = run(r#"[["D","Q","R"],["10mm", 50000, "AcmeCo"]]"#, groups);

    let result = h.service.generate_invoices(&run, &h.reporter).await;

    assert!(matches!(result, Err(ReconciliationError::Validation(_))));
    assert_eq!(h.invoices.save_calls(), 0);
    assert_eq!(h.customers.update_calls(), 0);
    assert_eq!(h.reporter.messages(), vec![StatusMessage::GenerationError]);
    assert!(matches!(
      h.service.summarize(&run),
      Err(ReconciliationError::Validation(_))
    ));
  }

  #[tokio::test]
  async fn test_sub_cent_rate_is_refused() {
    let h = harness();
    let mut groups = GroupConfigurations::new();
    groups.insert(
      "AcmeCo".to_string(),
      GroupConfig::for_customer(id("c1")).with_rates(Some(dec!(5.125)), None),
    );
    let run = run(r#"[["D","Q","R"],["10mm", 1, "AcmeCo"]]"#, groups);

    let result = h.service.generate_invoices(&run, &h.reporter).await;

    assert!(matches!(result, Err(ReconciliationError::Validation(_))));
  }

  /// Reads every customer and then yields, so two runs interleave between read and update.
  struct InterleavingCustomers(InMemoryCustomerRepository);

  #[async_trait::async_trait]
  impl CustomerRepository for InterleavingCustomers {
    async fn create(&self, customer: Customer) -> Result<Customer, InvoiceError> {
      self.0.create(customer).await
    }

    async fn add_totals(
      &self,
      id: &CustomerId,
      delta: &RunningTotals,
    ) -> Result<TotalsUpdate, InvoiceError> {
      self.0.add_totals(id, delta).await
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, InvoiceError> {
      self.0.find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Customer>, InvoiceError> {
      let customers = self.0.find_all().await;
      tokio::task::yield_now().await;
      customers
    }
  }

  #[tokio::test]
  async fn test_concurrent_runs_keep_both_deltas() {
    let customers = Arc::new(InterleavingCustomers(
      InMemoryCustomerRepository::with_customers(vec![customer("c1", "AcmeCo")]),
    ));
    let service = ReconciliationService::new(
      customers.clone(),
      Arc::new(InMemoryInvoiceRepository::new()),
      ReconciliationSettings::default(),
      BillingProfile::default(),
    );
    let reporter = BufferedStatusReporter::default();
    let run = run(r#"[["D","Q","R"],["10mm", 10, "AcmeCo"]]"#, acme_groups());

    let (first, second) = tokio::join!(
      service.generate_invoices(&run, &reporter),
      service.generate_invoices(&run, &reporter)
    );
    first.unwrap();
    second.unwrap();

    let stored = customers.find_by_id(&id("c1")).await.unwrap().unwrap();
    assert_eq!(stored.totals, RunningTotals::new(dec!(20), dec!(0)));
  }

  #[tokio::test]
  async fn test_quantity_above_ceiling_bills_zero() {
    let h = harness();
    let run = run(r#"[["D","Q","R"],["10mm gravel", "1200000", "AcmeCo"]]"#, acme_groups());

    let report = h.service.generate_invoices(&run, &h.reporter).await.unwrap();

    let invoice = &report.invoices[0];
    assert_eq!(invoice.items.len(), 1);
    assert_eq!(invoice.items[0].quantity, dec!(0));
    assert_eq!(invoice.total, dec!(0));
    // zero delta: totals are left alone
    assert!(report.customer_updates.is_empty());
    assert_eq!(h.customers.update_calls(), 0);
  }

  #[tokio::test]
  async fn test_nothing_to_do_makes_no_store_calls() {
    let h = harness();
    let run = run(
      r#"[["D","Q","R"],["10mm", 1, "Not Matched"],["20mm", 2, "Unknown"]]"#,
      acme_groups(),
    );

    let report = h.service.generate_invoices(&run, &h.reporter).await.unwrap();

    assert_eq!(report.outcome(), RunOutcome::NothingToDo);
    assert_eq!(h.customers.update_calls(), 0);
    assert_eq!(h.invoices.save_calls(), 0);
    assert_eq!(
      h.reporter.messages(),
      vec![StatusMessage::NoMatchingRows]
    );
  }

  #[tokio::test]
  async fn test_missing_output_configuration() {
    let h = harness();
    let mut run = run(r#"[["D","Q","R"],["10mm", 1, "AcmeCo"]]"#, acme_groups());
    run.columns = None;

    let result = h.service.generate_invoices(&run, &h.reporter).await;

    assert!(matches!(result, Err(ReconciliationError::MissingOutputConfiguration)));
    assert_eq!(
      h.reporter.rendered(),
      vec!["Output file configuration missing.".to_string()]
    );
    assert_eq!(h.invoices.save_calls(), 0);
  }

  #[tokio::test]
  async fn test_no_customer_assigned() {
    let h = harness();
    let mut groups = GroupConfigurations::new();
    groups.insert("AcmeCo".to_string(), GroupConfig::default());
    let run = run(r#"[["D","Q","R"],["10mm", 1, "AcmeCo"]]"#, groups);

    let result = h.service.generate_invoices(&run, &h.reporter).await;

    assert!(matches!(result, Err(ReconciliationError::NoCustomerAssigned)));
    assert_eq!(h.reporter.messages(), vec![StatusMessage::NoCustomerAssigned]);
  }

  #[tokio::test]
  async fn test_unset_quantity_warns_and_continues() {
    let h = harness();
    let mut run = run(r#"[["D","Weight","R"],["10mm", 4, "AcmeCo"]]"#, acme_groups());
    run.columns = Some(ColumnSelection::from_indices(0, -1, Some(2)));

    let report = h.service.generate_invoices(&run, &h.reporter).await.unwrap();

    assert_eq!(report.success_count, 1);
    assert_eq!(report.invoices[0].items[0].quantity, dec!(0));
    assert_eq!(
      h.reporter.messages(),
      vec![
        StatusMessage::QuantityColumnNotSelected,
        StatusMessage::InvoicesGenerated(1)
      ]
    );
  }

  #[tokio::test]
  async fn test_auto_detected_quantity_column() {
    let customers = Arc::new(InMemoryCustomerRepository::with_customers(vec![customer(
      "c1", "AcmeCo",
    )]));
    let service = ReconciliationService::new(
      customers,
      Arc::new(InMemoryInvoiceRepository::new()),
      ReconciliationSettings {
        auto_detect_quantity_column: true,
        ..ReconciliationSettings::default()
      },
      BillingProfile::default(),
    );
    let reporter = BufferedStatusReporter::default();
    let mut run = run(r#"[["D","Net Weight","R"],["10mm", 4, "AcmeCo"]]"#, acme_groups());
    run.columns = Some(ColumnSelection::from_indices(0, -1, Some(2)));

    let report = service.generate_invoices(&run, &reporter).await.unwrap();

    assert_eq!(report.invoices[0].items[0].quantity, dec!(4));
    assert_eq!(reporter.messages(), vec![StatusMessage::InvoicesGenerated(1)]);
  }

  #[tokio::test]
  async fn test_running_twice_doubles_delta() {
    let h = harness();
    let run = run(
      r#"[["D","Q","R"],["10mm", 3, "AcmeCo"],["20mm", 2, "AcmeCo"]]"#,
      acme_groups(),
    );

    h.service.generate_invoices(&run, &h.reporter).await.unwrap();
    h.service.generate_invoices(&run, &h.reporter).await.unwrap();

    let stored = h.customers.find_by_id(&id("c1")).await.unwrap().unwrap();
    assert_eq!(stored.totals, RunningTotals::new(dec!(6), dec!(4)));
    assert_eq!(h.invoices.snapshot().await.len(), 2);
  }

  #[tokio::test]
  async fn test_unknown_customer_is_skipped() {
    let h = harness();
    let mut groups = acme_groups();
    groups.insert("Ghost".to_string(), GroupConfig::for_customer(id("ghost")));
    let run = run(
      r#"[["D","Q","R"],["10mm", 1, "Ghost"],["10mm", 2, "AcmeCo"]]"#,
      groups,
    );

    let report = h.service.generate_invoices(&run, &h.reporter).await.unwrap();

    assert_eq!(report.success_count, 1);
    assert_eq!(report.skipped_customers, vec![id("ghost")]);
  }

  #[tokio::test]
  async fn test_only_unknown_customers_is_nothing_to_do() {
    let h = harness();
    let mut groups = GroupConfigurations::new();
    groups.insert("Ghost".to_string(), GroupConfig::for_customer(id("ghost")));
    let run = run(r#"[["D","Q","R"],["10mm", 1, "Ghost"]]"#, groups);

    let report = h.service.generate_invoices(&run, &h.reporter).await.unwrap();

    assert_eq!(report.outcome(), RunOutcome::NothingToDo);
    assert_eq!(h.invoices.save_calls(), 0);
    assert_eq!(h.reporter.messages(), vec![StatusMessage::NoMatchingRows]);
  }

  #[tokio::test]
  async fn test_partial_failure_is_counted() {
    let h = harness_with(
      InMemoryCustomerRepository::with_customers(vec![
        customer("c1", "AcmeCo"),
        customer("c2", "Beta"),
      ]),
      InMemoryInvoiceRepository::new().with_rejection(id("c2"), "constraint"),
    );
    let mut groups = acme_groups();
    groups.insert("Beta".to_string(), GroupConfig::for_customer(id("c2")));
    let run = run(r#"[["D","Q","R"],["10mm", 1, "AcmeCo"],["10mm", 1, "Beta"]]"#, groups);

    let report = h.service.generate_invoices(&run, &h.reporter).await.unwrap();

    assert_eq!(report.success_count, 1);
    assert_eq!(report.fail_count, 1);
    assert_eq!(
      h.reporter.messages(),
      vec![StatusMessage::InvoicesGenerated(1), StatusMessage::InvoicesNotSaved(1)]
    );
  }

  #[tokio::test]
  async fn test_all_rejected_reports_failure() {
    let h = harness_with(
      InMemoryCustomerRepository::with_customers(vec![customer("c1", "AcmeCo")]),
      InMemoryInvoiceRepository::new().with_rejection(id("c1"), "constraint"),
    );
    let run = run(r#"[["D","Q","R"],["10mm", 1, "AcmeCo"]]"#, acme_groups());

    let report = h.service.generate_invoices(&run, &h.reporter).await.unwrap();

    assert_eq!(report.outcome(), RunOutcome::Failed);
    assert_eq!(h.reporter.messages(), vec![StatusMessage::GenerationFailed]);
  }

  #[tokio::test]
  async fn test_store_error_aborts_run() {
    let h = harness_with(
      InMemoryCustomerRepository::with_customers(vec![customer("c1", "AcmeCo")])
        .with_fault(id("c1")),
      InMemoryInvoiceRepository::new(),
    );
    let run = run(r#"[["D","Q","R"],["10mm", 1, "AcmeCo"]]"#, acme_groups());

    let result = h.service.generate_invoices(&run, &h.reporter).await;

    assert!(matches!(
      result,
      Err(ReconciliationError::Store(InvoiceError::Repository(_)))
    ));
    assert_eq!(h.invoices.save_calls(), 0);
    assert_eq!(
      h.reporter.rendered(),
      vec!["An error occurred during generation.".to_string()]
    );
  }

  #[test]
  fn test_summarize_requires_columns() {
    let h = harness();
    let mut run = run(r#"[["D","Weight","R"],["10mm", 4, "AcmeCo"]]"#, acme_groups());
    run.columns = None;
    assert!(matches!(
      h.service.summarize(&run),
      Err(ReconciliationError::MissingOutputConfiguration)
    ));

    run.columns = Some(ColumnSelection::from_indices(0, -1, Some(2)));
    let stats = h.service.summarize(&run).unwrap();
    assert_eq!(stats.total10, dec!(4));
    assert_eq!(stats.customers[0].trips10, 1);
  }

  #[tokio::test]
  async fn test_suggest_customers_for_unassigned_groups() {
    let h = harness_with(
      InMemoryCustomerRepository::with_customers(vec![
        customer("c1", "AcmeCo"),
        customer("c2", "Harbor Works"),
      ]),
      InMemoryInvoiceRepository::new(),
    );
    let mut groups = acme_groups();
    groups.insert(
      "/uploads/harbor_works_june.xlsx".to_string(),
      GroupConfig::default().with_display_name("harbor_works_june.xlsx"),
    );
    groups.insert("Mystery".to_string(), GroupConfig::default());

    let suggestions = h.service.suggest_customers(&groups).await.unwrap();

    assert_eq!(suggestions.len(), 2);
    assert_eq!(
      suggestions[0].customer.as_ref().map(|c| c.id.clone()),
      Some(id("c2"))
    );
    assert_eq!(suggestions[1].group_key, "Mystery");
    assert!(suggestions[1].customer.is_none());
  }
}
