//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access for the usage ledger.
//! - Keep SQL inside the persistence boundary.
//!
//! # Invariants
//! - Writes validate day keys, durations and settings before touching SQL.
//! - Reads reject malformed persisted rows instead of masking them.

pub mod usage_repo;
