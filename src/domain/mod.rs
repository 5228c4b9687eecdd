pub mod invoice;
pub mod reconciliation;
