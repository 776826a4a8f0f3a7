//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Rendered help and target output go to stdout. Errors, warnings and debug
//! traces go to stderr so they never mix with what a target prints.

use std::fmt::Display;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Normal mode - standard output
    #[default]
    Normal,
    /// Debug mode - phase and registration traces
    Debug,
}

impl Verbosity {
    /// Create verbosity from the debug mode toggle.
    pub fn from_flags(debug: bool) -> Self {
        if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message to stdout.
pub fn print(message: impl Display) {
    println!("{}", message);
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Pad `rows` into two aligned columns, each line indented by two spaces.
///
/// Widths are counted in characters, so non-ASCII names still line up.
pub fn columns(rows: &[(String, String)]) -> String {
    let width = rows
        .iter()
        .map(|(left, _)| left.chars().count())
        .max()
        .unwrap_or(0);
    rows.iter()
        .map(|(left, right)| {
            if right.is_empty() {
                format!("  {}", left)
            } else {
                let pad = width - left.chars().count();
                format!("  {}{}  {}", left, " ".repeat(pad), right)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
