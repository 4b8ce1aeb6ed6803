//! print-template
//!
//! Turns a template reference into a browser-loadable HTML file: fetch or
//! read the source, substitute request context, fix up relative references.

pub mod error;
pub mod generator;
pub mod processor;
pub mod render;
pub mod source;
