pub mod aggregator;
pub mod classifier;
pub mod columns;
pub mod emitter;
pub mod errors;
pub mod normalizer;
pub mod reporting;
pub mod resolver;
pub mod scan;
pub mod services;
pub mod stats;
pub mod suggest;
pub mod table;

pub use aggregator::{Aggregation, CustomerAccumulation};
pub use columns::ColumnSelection;
pub use emitter::{BillingProfile, EmissionReport, InvoiceEmitter, RunOutcome};
pub use errors::ReconciliationError;
pub use reporting::{StatusLevel, StatusMessage, StatusReporter};
pub use resolver::{GroupConfig, GroupConfigurations, GroupResolver, ResolutionStrategy};
pub use services::{
  CustomerSuggestion, ReconciliationRun, ReconciliationService, ReconciliationSettings,
};
pub use stats::ReconciliationStats;
pub use table::{CellValue, Row, Table};
