//! core
//!
//! Declarations and schemas the engine operates on.
//!
//! # Modules
//!
//! - [`types`] - Argument types and token classification
//! - [`naming`] - Handler identifiers and environment variable names
//! - [`flag`] - Flag declarations
//! - [`registry`] - The flag registry of the active target
//! - [`positional`] - Ordered positional argument declarations
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Declarations are validated when registered, never when used
//! - Schemas are strict and self-describing

pub mod config;
pub mod flag;
pub mod naming;
pub mod positional;
pub mod registry;
pub mod types;
