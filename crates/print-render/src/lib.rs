//! print-render
//!
//! HTML to PDF rasterization through one long-lived headless Chromium.
//! The engine relaunches the browser on its own when the DevTools
//! connection drops.

pub mod chrome;
pub mod engine;
pub mod error;
pub mod idle;
pub mod options;
pub mod renderer;
