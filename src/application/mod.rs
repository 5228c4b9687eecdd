//! Application layer
//!
//! Use cases that turn transport-level commands into calls on the domain services and
//! shape their results into serializable responses.

pub mod invoice;
pub mod reconciliation;
