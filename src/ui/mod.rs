//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity-aware printing to stdout and stderr
//! - [`help`] - Summary and per-target help rendering

pub mod help;
pub mod output;
