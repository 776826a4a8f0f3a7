//! engine::resolve
//!
//! Positional argument resolution.
//!
//! Each non-variadic declaration takes exactly one token. A trailing
//! variadic declaration takes every remaining token, possibly none. Tokens
//! are type-checked one by one and resolution stops at the first failure.
//! Tokens left over when no variadic declaration exists are rejected.

use super::parse::{check_type, ArgError};
use super::stream::ArgStream;
use crate::core::positional::PositionalSpecs;

/// Consume the remaining tokens against a target's declarations.
///
/// # Errors
///
/// - `MissingArgument` when a non-variadic declaration finds no token
/// - `ArgumentTypeMismatch` when a token has the wrong type
/// - `UnexpectedArgument` when tokens remain after the last declaration
pub fn resolve_positionals(
    stream: &mut ArgStream,
    specs: &PositionalSpecs,
) -> Result<Vec<String>, ArgError> {
    let mut resolved = Vec::with_capacity(stream.len());

    for spec in specs {
        let subject = || format!("argument '{}'", spec.name);

        if spec.variadic {
            for token in stream.drain() {
                check_type(subject, &token, spec.ty)?;
                resolved.push(token);
            }
            break;
        }

        let token = stream
            .pop()
            .ok_or_else(|| ArgError::MissingArgument { subject: subject() })?;
        check_type(subject, &token, spec.ty)?;
        resolved.push(token);
    }

    if let Some(extra) = stream.pop() {
        return Err(ArgError::UnexpectedArgument(extra));
    }

    Ok(resolved)
}
