//! Domain model for customer marks.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own input validation so no invalid record reaches the store.
//!
//! # Invariants
//! - Records are identified by a store-generated `RecordId`.

pub mod notice;
pub mod record;
