//! cli
//!
//! Command-line front end for the `fw` binary.
//!
//! # Responsibilities
//!
//! - Load configuration for the current directory
//! - Hand the raw argument vector to the [`crate::engine`]
//! - Print help or errors and map the result to an exit status
//!
//! # Exit Status
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success, or help was shown |
//! | 1 | A flag or target handler failed (external commands pass their own status) |
//! | 2 | Invalid invocation |
//! | 3 | Invalid flag, argument or target definition |
//! | 4 | Missing dependency |
//! | 5 | Invalid configuration |

use std::ffi::OsString;

use anyhow::{Context as _, Result};

use crate::core::config::{Config, ConfigError};
use crate::engine::runner::EXIT_FAILURE;
use crate::engine::{ArgError, Engine, Outcome, RunError};
use crate::ui::output;

/// Name shown in usage lines.
pub const PROGRAM: &str = "fw";

pub const EXIT_SUCCESS: i32 = 0;
/// Exit status for unreadable or invalid configuration.
pub const EXIT_CONFIG: i32 = 5;

/// Run the CLI application and return the process exit status.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> i32 {
    match collect_args(std::env::args_os().skip(1)).and_then(run_with) {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            exit_code(&err)
        }
    }
}

/// Convert raw arguments to strings, rejecting any that are not valid UTF-8.
fn collect_args(raw: impl IntoIterator<Item = OsString>) -> Result<Vec<String>> {
    raw.into_iter()
        .map(|arg| {
            arg.into_string().map_err(|arg| {
                anyhow::Error::from(RunError::from(ArgError::NotUnicode(
                    arg.to_string_lossy().into_owned(),
                )))
            })
        })
        .collect()
}

fn run_with(args: Vec<String>) -> Result<()> {
    let cwd = std::env::current_dir().context("cannot determine the current directory")?;
    let config = Config::load(Some(cwd.as_path()))?;

    let mut engine = Engine::with_config(PROGRAM, &config);
    let verbosity = engine.session().verbosity();
    if let Some(path) = config.global_config_loaded_from() {
        output::debug(format!("global config: {}", path.display()), verbosity);
    }
    if let Some(path) = config.project_config_loaded_from() {
        output::debug(format!("project config: {}", path.display()), verbosity);
    }
    for dir in engine.catalog().dirs() {
        if !dir.is_dir() {
            output::debug(format!("target directory {} does not exist", dir.display()), verbosity);
        }
    }

    match engine.dispatch(args)? {
        Outcome::Help(text) => output::print(text.trim_end()),
        Outcome::Completed { target } => output::debug(
            format!("target '{}' completed", target),
            engine.session().verbosity(),
        ),
    }
    Ok(())
}

/// Map an error to its process exit status.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(run) = err.downcast_ref::<RunError>() {
        run.exit_code()
    } else if err.downcast_ref::<ConfigError>().is_some() {
        EXIT_CONFIG
    } else {
        EXIT_FAILURE
    }
}
