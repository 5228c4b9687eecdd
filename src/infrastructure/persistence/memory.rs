//! In-process stores for the `memory` database backend and for tests.
//!
//! Both stores can be scripted per customer id: a *rejection* makes writes return a
//! rejected outcome, a *fault* makes them return an error.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::domain::invoice::{
  Customer, CustomerId, CustomerRepository, Invoice, InvoiceError, InvoiceRepository,
  RunningTotals, SaveOutcome, TotalsUpdate,
};

#[derive(Debug, Default)]
struct Script {
  rejections: HashMap<CustomerId, String>,
  faults: Vec<CustomerId>,
}

impl Script {
  /// Scripted rejection reason for `customer_id`, or the scripted fault.
  fn check(&self, customer_id: Option<&CustomerId>) -> Result<Option<String>, InvoiceError> {
    let Some(customer_id) = customer_id else {
      return Ok(None);
    };
    if self.faults.contains(customer_id) {
      return Err(InvoiceError::Repository(format!(
        "Store unavailable for customer {}",
        customer_id
      )));
    }
    Ok(self.rejections.get(customer_id).cloned())
  }
}

#[derive(Debug, Default)]
pub struct InMemoryCustomerRepository {
  customers: RwLock<Vec<Customer>>,
  script: Script,
  update_calls: AtomicUsize,
}

impl InMemoryCustomerRepository {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_customers(customers: Vec<Customer>) -> Self {
    Self {
      customers: RwLock::new(customers),
      ..Self::default()
    }
  }

  pub fn with_rejection(mut self, customer_id: CustomerId, reason: impl Into<String>) -> Self {
    self.script.rejections.insert(customer_id, reason.into());
    self
  }

  pub fn with_fault(mut self, customer_id: CustomerId) -> Self {
    self.script.faults.push(customer_id);
    self
  }

  pub fn update_calls(&self) -> usize {
    self.update_calls.load(Ordering::SeqCst)
  }

  pub async fn snapshot(&self) -> Vec<Customer> {
    self.customers.read().await.clone()
  }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
  async fn create(&self, customer: Customer) -> Result<Customer, InvoiceError> {
    let mut customers = self.customers.write().await;
    if customers.iter().any(|existing| existing.id == customer.id) {
      return Err(InvoiceError::CustomerAlreadyExists(customer.id));
    }
    customers.push(customer.clone());
    Ok(customer)
  }

  async fn add_totals(
    &self,
    id: &CustomerId,
    delta: &RunningTotals,
  ) -> Result<TotalsUpdate, InvoiceError> {
    self.update_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(reason) = self.script.check(Some(id))? {
      return Ok(TotalsUpdate::Rejected(reason));
    }

    // read-modify-write stays under one write guard
    let mut customers = self.customers.write().await;
    match customers.iter_mut().find(|existing| &existing.id == id) {
      Some(existing) => {
        *existing = existing.with_added_totals(delta);
        Ok(TotalsUpdate::Applied(existing.clone()))
      }
      None => Ok(TotalsUpdate::Rejected(format!("Customer {} does not exist", id))),
    }
  }

  async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, InvoiceError> {
    let customers = self.customers.read().await;
    Ok(customers.iter().find(|customer| &customer.id == id).cloned())
  }

  async fn find_all(&self) -> Result<Vec<Customer>, InvoiceError> {
    let mut customers = self.snapshot().await;
    customers.sort_by(|a, b| a.name.value().cmp(b.name.value()));
    Ok(customers)
  }
}

#[derive(Debug, Default)]
pub struct InMemoryInvoiceRepository {
  invoices: RwLock<Vec<Invoice>>,
  script: Script,
  save_calls: AtomicUsize,
}

impl InMemoryInvoiceRepository {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_rejection(mut self, customer_id: CustomerId, reason: impl Into<String>) -> Self {
    self.script.rejections.insert(customer_id, reason.into());
    self
  }

  pub fn with_fault(mut self, customer_id: CustomerId) -> Self {
    self.script.faults.push(customer_id);
    self
  }

  pub fn save_calls(&self) -> usize {
    self.save_calls.load(Ordering::SeqCst)
  }

  pub async fn snapshot(&self) -> Vec<Invoice> {
    self.invoices.read().await.clone()
  }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
  async fn save(&self, invoice: &Invoice) -> Result<SaveOutcome, InvoiceError> {
    self.save_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(reason) = self.script.check(invoice.customer_id())? {
      return Ok(SaveOutcome::Rejected(reason));
    }

    let mut invoices = self.invoices.write().await;
    if invoices.iter().any(|existing| existing.id == invoice.id) {
      return Ok(SaveOutcome::Rejected(format!(
        "Invoice {} already exists",
        invoice.id
      )));
    }
    invoices.push(invoice.clone());
    Ok(SaveOutcome::Saved)
  }

  async fn find_by_customer(&self, customer_id: &CustomerId) -> Result<Vec<Invoice>, InvoiceError> {
    let invoices = self.invoices.read().await;
    Ok(
      invoices
        .iter()
        .filter(|invoice| invoice.customer_id() == Some(customer_id))
        .cloned()
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::invoice::{
    Currency, CustomerName, InvoiceLineItem, Party, ProductClass, TaxRate,
  };
  use rust_decimal_macros::dec;

  fn customer(id: &str, name: &str) -> Customer {
    Customer::new(
      CustomerId::new(id).unwrap(),
      CustomerName::new(name.to_string()).unwrap(),
      None,
      None,
      None,
    )
  }

  fn invoice_for(customer: &Customer) -> Invoice {
    Invoice::draft(
      Party::default(),
      Party::for_customer(customer),
      vec![
        InvoiceLineItem::new("10mm".to_string(), dec!(1), dec!(1), ProductClass::Class10).unwrap(),
      ],
      Currency::QAR,
      TaxRate::default(),
      None,
    )
    .unwrap()
  }

  #[tokio::test]
  async fn test_customer_create_and_find() {
    let repo = InMemoryCustomerRepository::new();
    repo.create(customer("b", "Zeta")).await.unwrap();
    repo.create(customer("a", "Alpha")).await.unwrap();

    let duplicate = repo.create(customer("a", "Again")).await;
    assert!(matches!(duplicate, Err(InvoiceError::CustomerAlreadyExists(_))));

    let all = repo.find_all().await.unwrap();
    let names: Vec<&str> = all.iter().map(|c| c.name.value()).collect();
    assert_eq!(names, vec!["Alpha", "Zeta"]);
    assert!(repo.find_by_id(&CustomerId::new("zz").unwrap()).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_add_totals_unknown_is_rejected() {
    let repo = InMemoryCustomerRepository::new();
    let outcome = repo
      .add_totals(&CustomerId::new("a").unwrap(), &RunningTotals::new(dec!(1), dec!(0)))
      .await
      .unwrap();
    assert!(matches!(outcome, TotalsUpdate::Rejected(_)));
    assert_eq!(repo.update_calls(), 1);
  }

  #[tokio::test]
  async fn test_add_totals_increments_stored_values() {
    let repo = InMemoryCustomerRepository::with_customers(vec![customer("a", "Alpha")]);
    let id = CustomerId::new("a").unwrap();

    repo.add_totals(&id, &RunningTotals::new(dec!(10), dec!(1))).await.unwrap();
    let outcome = repo
      .add_totals(&id, &RunningTotals::new(dec!(2.5), dec!(0)))
      .await
      .unwrap();

    let updated = match outcome {
      TotalsUpdate::Applied(customer) => customer,
      other => panic!("expected applied update, got {:?}", other),
    };
    assert_eq!(updated.totals, RunningTotals::new(dec!(12.5), dec!(1)));
    assert_eq!(repo.find_by_id(&id).await.unwrap().unwrap().totals, updated.totals);
  }

  #[tokio::test]
  async fn test_concurrent_add_totals_are_not_lost() {
    let repo = std::sync::Arc::new(InMemoryCustomerRepository::with_customers(vec![customer(
      "a", "Alpha",
    )]));
    let id = CustomerId::new("a").unwrap();

    let tasks: Vec<_> = (0..8)
      .map(|_| {
        let repo = repo.clone();
        let id = id.clone();
        tokio::spawn(async move {
          repo.add_totals(&id, &RunningTotals::new(dec!(10), dec!(0))).await
        })
      })
      .collect();
    for task in tasks {
      task.await.unwrap().unwrap();
    }

    let stored = repo.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.totals, RunningTotals::new(dec!(80), dec!(0)));
  }

  #[tokio::test]
  async fn test_scripted_fault_returns_error() {
    let repo = InMemoryCustomerRepository::with_customers(vec![customer("a", "Alpha")])
      .with_fault(CustomerId::new("a").unwrap());
    let result = repo
      .add_totals(&CustomerId::new("a").unwrap(), &RunningTotals::default())
      .await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn test_invoice_save_and_find_by_customer() {
    let alpha = customer("a", "Alpha");
    let beta = customer("b", "Beta");
    let repo = InMemoryInvoiceRepository::new().with_rejection(beta.id.clone(), "locked");

    let invoice = invoice_for(&alpha);
    assert_eq!(repo.save(&invoice).await.unwrap(), SaveOutcome::Saved);
    assert!(!repo.save(&invoice).await.unwrap().is_saved());
    assert_eq!(
      repo.save(&invoice_for(&beta)).await.unwrap(),
      SaveOutcome::Rejected("locked".to_string())
    );

    assert_eq!(repo.find_by_customer(&alpha.id).await.unwrap().len(), 1);
    assert!(repo.find_by_customer(&beta.id).await.unwrap().is_empty());
    assert_eq!(repo.save_calls(), 3);
  }
}
