//! Mobile host bindings for `tigerfire_core`.

pub mod api;
