//! engine::parse
//!
//! Flag token parser.
//!
//! # Grammar
//!
//! While the head of the stream starts with `-`:
//!
//! - `--name` resolves a long flag
//! - `-abc` resolves each character as a short flag, left to right
//! - `--` alone ends flag parsing and is consumed
//! - `-` alone is not a flag and stops parsing
//!
//! A flag that declares an argument takes the next token of the stream,
//! never the rest of its own cluster. Several flags in one cluster that each
//! declare an argument consume successive stream tokens in cluster order.
//!
//! # Output
//!
//! One [`ScheduledInvocation`] per resolved flag, in parse order. Ordering
//! by priority is the scheduler's job.

use std::fmt;

use thiserror::Error;

use super::stream::ArgStream;
use super::{FlagHandler, Registry, Session};
use crate::core::flag::FlagSpec;
use crate::core::types::{classify, ArgType};

/// Errors from consuming and validating argument tokens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgError {
    #[error("unknown flag '-{flag}' in '{token}' (run with --help for usage)")]
    UnknownFlag { flag: char, token: String },

    #[error("unknown flag '--{0}' (run with --help for usage)")]
    UnknownFlagName(String),

    #[error("{subject} expects {expected} but '{value}' is {inferred}")]
    ArgumentTypeMismatch {
        subject: String,
        value: String,
        expected: ArgType,
        inferred: ArgType,
    },

    #[error("missing {subject}")]
    MissingArgument { subject: String },

    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),

    #[error("argument '{0}' is not valid UTF-8")]
    NotUnicode(String),
}

/// Check a raw value against a declared type.
///
/// # Errors
///
/// Returns `ArgumentTypeMismatch` naming `subject` when the inferred type
/// is not accepted.
pub fn check_type(
    subject: impl FnOnce() -> String,
    value: &str,
    expected: ArgType,
) -> Result<(), ArgError> {
    if !expected.is_checked() {
        return Ok(());
    }
    let inferred = classify(value);
    if expected.accepts(inferred) {
        Ok(())
    } else {
        Err(ArgError::ArgumentTypeMismatch {
            subject: subject(),
            value: value.to_string(),
            expected,
            inferred,
        })
    }
}

/// A resolved flag waiting to run.
#[derive(Clone)]
pub struct ScheduledInvocation {
    pub priority: u8,
    /// Long name of the flag.
    pub flag: String,
    /// Handler identifier, `flag_name_<normalized>`.
    pub identifier: String,
    pub argument: Option<String>,
    handler: FlagHandler,
}

impl ScheduledInvocation {
    pub fn new(spec: &FlagSpec, argument: Option<String>, handler: FlagHandler) -> Self {
        Self {
            priority: spec.priority,
            flag: spec.long.clone(),
            identifier: spec.identifier(),
            argument,
            handler,
        }
    }

    /// The handler this invocation will call.
    pub fn handler(&self) -> &FlagHandler {
        &self.handler
    }

    /// Call the flag handler with the consumed argument.
    pub fn invoke(&self, session: &mut Session) -> anyhow::Result<()> {
        (self.handler)(session, self.argument.as_deref())
    }
}

impl fmt::Debug for ScheduledInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledInvocation")
            .field("priority", &self.priority)
            .field("flag", &self.flag)
            .field("argument", &self.argument)
            .finish_non_exhaustive()
    }
}

/// Whether a token is shaped like a flag.
fn is_flag_token(token: &str) -> bool {
    token.starts_with('-') && token != "-"
}

/// Drain leading flag tokens from `stream` into a pending schedule.
///
/// # Errors
///
/// - `UnknownFlag` / `UnknownFlagName` for unregistered flags
/// - `MissingArgument` when a flag's argument is absent from the stream
/// - `ArgumentTypeMismatch` when a flag's argument has the wrong type
pub fn parse_flags(
    stream: &mut ArgStream,
    registry: &Registry,
) -> Result<Vec<ScheduledInvocation>, ArgError> {
    let mut pending = Vec::new();

    while let Some(token) = stream.pop_if(is_flag_token) {
        if token == "--" {
            break;
        }

        if let Some(name) = token.strip_prefix("--") {
            let entry = registry
                .lookup_by_name(name)
                .ok_or_else(|| ArgError::UnknownFlagName(name.to_string()))?;
            let argument = take_flag_argument(&entry.spec, stream)?;
            pending.push(ScheduledInvocation::new(
                &entry.spec,
                argument,
                entry.handler.clone(),
            ));
        } else {
            for c in token.chars().skip(1) {
                let entry = registry.lookup(c).ok_or_else(|| ArgError::UnknownFlag {
                    flag: c,
                    token: token.clone(),
                })?;
                let argument = take_flag_argument(&entry.spec, stream)?;
                pending.push(ScheduledInvocation::new(
                    &entry.spec,
                    argument,
                    entry.handler.clone(),
                ));
            }
        }
    }

    Ok(pending)
}

/// Consume and type-check the argument of `spec`, if it declares one.
fn take_flag_argument(
    spec: &FlagSpec,
    stream: &mut ArgStream,
) -> Result<Option<String>, ArgError> {
    let Some(arg) = &spec.argument else {
        return Ok(None);
    };
    let subject = || format!("argument '{}' of flag '--{}'", arg.name, spec.long);

    let value = stream
        .pop()
        .ok_or_else(|| ArgError::MissingArgument { subject: subject() })?;
    check_type(subject, &value, arg.ty)?;
    Ok(Some(value))
}
