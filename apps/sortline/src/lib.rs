//! # Sortline Library
//!
//! This library exposes the Sortline modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod cli;
pub mod secrets;
pub mod vision;

// Re-export sortline_core for convenience
pub use sortline_core;
