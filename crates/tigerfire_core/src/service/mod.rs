//! Use-case services.
//!
//! # Responsibility
//! - Combine the time capability with repository calls into use-case APIs.
//! - Keep FFI callers decoupled from storage and clock details.

pub mod usage_service;
