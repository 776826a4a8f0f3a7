//! target::builtin
//!
//! Flags present in every registry and the `help` target.

use anyhow::Context as _;

use super::{Registration, TargetError};
use crate::core::flag::FlagSpec;
use crate::core::types::ArgType;
use crate::engine::{flag_handler, ArgError, FlagHandler, Halt};

/// Name of the builtin help target.
pub const HELP_TARGET: &str = "help";

/// Flags re-registered into every fresh registry.
///
/// Mode toggles run at priority 0 so that the help flags, at priority 9,
/// render with every toggle already applied.
pub fn builtin_flags() -> Vec<(FlagSpec, FlagHandler)> {
    vec![
        (
            FlagSpec::new("help", "Show targets and common flags", 9).short('h'),
            flag_handler(|session, _| {
                session.halt(Halt::Summary);
                Ok(())
            }),
        ),
        (
            FlagSpec::new("help-target", "Show detailed help for one target", 9).argument(
                "target",
                ArgType::String,
                "Target to describe",
            ),
            flag_handler(|session, target| {
                let target = target.context("--help-target needs a target name")?;
                session.halt(Halt::TargetHelp(target.to_string()));
                Ok(())
            }),
        ),
        (
            FlagSpec::new(
                "preserve-flags",
                "Keep registered flags when the next target registers",
                0,
            ),
            flag_handler(|session, _| {
                session.modes.preserve_flags = true;
                Ok(())
            }),
        ),
        (
            FlagSpec::new("ignore-deps", "Skip the dependency check", 0),
            flag_handler(|session, _| {
                session.modes.ignore_deps = true;
                Ok(())
            }),
        ),
        (
            FlagSpec::new("debug", "Print debug output", 0),
            flag_handler(|session, _| {
                session.modes.debug = true;
                Ok(())
            }),
        ),
    ]
}

/// Registration of the `help [target]` target.
pub fn register_help(reg: &mut Registration<'_>) -> Result<(), TargetError> {
    reg.describe("Show the target list, or detailed help for one target")
        .add_argument("target...", "string", "Target to describe")?;
    reg.handler(|session, args| match args {
        [] => {
            session.halt(Halt::Summary);
            Ok(())
        }
        [target] => {
            session.halt(Halt::TargetHelp(target.clone()));
            Ok(())
        }
        [_, extra, ..] => Err(ArgError::UnexpectedArgument(extra.clone()).into()),
    });
    Ok(())
}
