use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::invoice::{
  Currency, Customer, CustomerId, CustomerRepository, Invoice, InvoiceError, InvoiceRepository,
  Party, RunningTotals, SaveOutcome, TaxRate, TotalsUpdate,
};

use super::aggregator::{consolidate, Aggregation};

/// Issuer and pricing applied to every invoice of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillingProfile {
  pub issuer: Party,
  pub currency: Currency,
  pub tax_rate: TaxRate,
  pub consolidate_line_items: bool,
}

/// Writes planned for one customer.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
  pub customer_id: CustomerId,
  /// Increment for the customer's running totals; absent when the run moved nothing.
  pub totals_delta: Option<RunningTotals>,
  pub invoice: Invoice,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmissionPlan {
  pub drafts: Vec<InvoiceDraft>,
  pub skipped_customers: Vec<CustomerId>,
}

impl EmissionPlan {
  pub fn is_empty(&self) -> bool {
    self.drafts.is_empty()
  }
}

/// Terminal state of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
  Generated(usize),
  Failed,
  NothingToDo,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmissionReport {
  pub invoices: Vec<Invoice>,
  pub customer_updates: Vec<Customer>,
  pub success_count: usize,
  pub fail_count: usize,
  pub rejected_customer_updates: usize,
  pub skipped_customers: Vec<CustomerId>,
}

impl EmissionReport {
  pub fn attempted(&self) -> usize {
    self.success_count + self.fail_count
  }

  pub fn outcome(&self) -> RunOutcome {
    if self.success_count > 0 {
      RunOutcome::Generated(self.success_count)
    } else if self.fail_count > 0 {
      RunOutcome::Failed
    } else {
      RunOutcome::NothingToDo
    }
  }
}

/// Turns an aggregation into per-customer drafts without touching any store.
///
/// Customers missing from `customers` are skipped and listed in the plan.
pub fn plan(
  aggregation: &Aggregation,
  customers: &[Customer],
  profile: &BillingProfile,
) -> Result<EmissionPlan, InvoiceError> {
  let directory: HashMap<&CustomerId, &Customer> =
    customers.iter().map(|customer| (&customer.id, customer)).collect();
  let mut plan = EmissionPlan::default();

  for accumulation in aggregation.customers() {
    let Some(customer) = directory.get(&accumulation.customer_id) else {
      tracing::debug!(customer_id = %accumulation.customer_id, "Customer not found, skipping");
      plan.skipped_customers.push(accumulation.customer_id.clone());
      continue;
    };

    let totals_delta = (!accumulation.delta.is_zero()).then_some(accumulation.delta);

    let row_count = accumulation.items.len();
    let items = if profile.consolidate_line_items {
      consolidate(accumulation.items.clone())?
    } else {
      accumulation.items.clone()
    };

    let invoice = Invoice::draft(
      profile.issuer.clone(),
      Party::for_customer(customer),
      items,
      profile.currency,
      profile.tax_rate,
      Some(format!("Auto-generated from {} reconciled row(s)", row_count)),
    )?;

    plan.drafts.push(InvoiceDraft {
      customer_id: customer.id.clone(),
      totals_delta,
      invoice,
    });
  }

  Ok(plan)
}

/// Persists emission plans one customer at a time.
pub struct InvoiceEmitter {
  customer_repo: Arc<dyn CustomerRepository>,
  invoice_repo: Arc<dyn InvoiceRepository>,
}

impl InvoiceEmitter {
  pub fn new(
    customer_repo: Arc<dyn CustomerRepository>,
    invoice_repo: Arc<dyn InvoiceRepository>,
  ) -> Self {
    Self {
      customer_repo,
      invoice_repo,
    }
  }

  /// Writes every draft in order. Rejected writes are counted; a store error stops the run
  /// and leaves earlier writes in place.
  pub async fn emit(&self, plan: EmissionPlan) -> Result<EmissionReport, InvoiceError> {
    let mut report = EmissionReport {
      skipped_customers: plan.skipped_customers,
      ..EmissionReport::default()
    };

    for draft in plan.drafts {
      if let Some(delta) = draft.totals_delta {
        let customer_id = &draft.customer_id;
        match self.customer_repo.add_totals(customer_id, &delta).await {
          Ok(TotalsUpdate::Applied(customer)) => report.customer_updates.push(customer),
          Ok(TotalsUpdate::Rejected(reason)) => {
            tracing::warn!(%customer_id, %reason, "Customer totals update rejected");
            report.rejected_customer_updates += 1;
          }
          Err(e) => {
            tracing::error!(%customer_id, saved = report.success_count, "Customer store failed: {}", e);
            return Err(e);
          }
        }
      }

      match self.invoice_repo.save(&draft.invoice).await {
        Ok(SaveOutcome::Saved) => {
          report.success_count += 1;
          report.invoices.push(draft.invoice);
        }
        Ok(SaveOutcome::Rejected(reason)) => {
          tracing::warn!(invoice_id = %draft.invoice.id, %reason, "Invoice save rejected");
          report.fail_count += 1;
        }
        Err(e) => {
          tracing::error!(invoice_id = %draft.invoice.id, saved = report.success_count, "Invoice store failed: {}", e);
          return Err(e);
        }
      }
    }

    tracing::info!(
      saved = report.success_count,
      failed = report.fail_count,
      skipped = report.skipped_customers.len(),
      "Invoices emitted"
    );

    Ok(report)
  }
}
