//! print-storage
//!
//! Azure Blob Storage operations. Thin Shared Key signed REST wrapper over
//! `reqwest`, plus the publisher used by the print pipeline.

pub mod auth;
pub mod blobs;
pub mod client;
pub mod error;
pub mod publisher;
