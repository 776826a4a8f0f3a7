//! Flagwork - declarative flag registration and subcommand dispatch
//!
//! Flagwork runs multi-command CLIs of the form
//! `fw [common-flag]... <target> [target-flag]... [positional]...`.
//! Each target declares its flags and positional arguments when it is
//! selected; the engine then parses, type-checks and runs them.
//!
//! # Architecture
//!
//! - [`cli`] - The `fw` binary front end (config loading, exit status)
//! - [`engine`] - Orchestrates Select -> Register -> Parse -> Execute -> Resolve -> Invoke
//! - [`core`] - Declarations: types, flags, registry, positionals, config
//! - [`target`] - Builtin targets and `.toml` target definitions
//! - [`ui`] - Output and help rendering
//!
//! # Correctness Invariants
//!
//! 1. Short and long flag names are unique within a registry
//! 2. Flags run in ascending priority, ties in command-line order
//! 3. A typed argument is checked before the handler that receives it runs
//! 4. At most one variadic positional exists, and it comes last

pub mod cli;
pub mod core;
pub mod engine;
pub mod target;
pub mod ui;
