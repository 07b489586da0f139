//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the gateway and reconciler contracts the service orchestrates.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes only accept validated `NewRecord` values.
//! - Repository APIs return typed errors; nothing panics on store failure.

pub mod record_repo;
pub mod sequence_repo;
