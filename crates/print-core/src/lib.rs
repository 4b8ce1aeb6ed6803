//! print-core
//!
//! Pure domain types for the print pipeline: request value objects, the
//! response envelope, input validation, and blob path conventions.
//! No HTTP, browser, or storage dependency.

pub mod blob_keys;
pub mod error;
pub mod models;
pub mod validate;
