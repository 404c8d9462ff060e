//! Domain model for the usage ledger.
//!
//! # Responsibility
//! - Define the records persisted next to the time capability.
//! - Keep validation rules in one place for repository and service callers.
//!
//! # Invariants
//! - Usage is keyed by `DateString` day keys, never by raw timestamps.
//! - Settings are validated before every write.

pub mod settings;
pub mod usage;
