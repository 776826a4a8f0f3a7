//! core::positional
//!
//! Ordered positional argument declarations of a target.
//!
//! # Invariants
//!
//! - At most one declaration is variadic
//! - A variadic declaration is always the last one
//!
//! Declarations written as `name...` are variadic; the suffix is stripped
//! from the stored name.

use std::fmt;

use thiserror::Error;

use super::types::ArgType;

/// Suffix marking a variadic declaration.
pub const VARIADIC_SUFFIX: &str = "...";

/// Errors from positional argument declarations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentSpecError {
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgumentSpec { name: String, reason: String },
}

/// A declared positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalSpec {
    pub name: String,
    pub ty: ArgType,
    pub description: String,
    pub variadic: bool,
}

impl PositionalSpec {
    /// Parse an `add_argument` style declaration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgumentSpec` if any field is empty or the type is
    /// unknown.
    pub fn declare(name: &str, ty: &str, description: &str) -> Result<Self, ArgumentSpecError> {
        let invalid = |reason: String| ArgumentSpecError::InvalidArgumentSpec {
            name: name.to_string(),
            reason,
        };

        let (base, variadic) = match name.strip_suffix(VARIADIC_SUFFIX) {
            Some(base) => (base, true),
            None => (name, false),
        };
        if base.trim().is_empty() {
            return Err(invalid("name is required".into()));
        }
        if base.starts_with('-') {
            return Err(invalid("name cannot start with '-'".into()));
        }
        if description.trim().is_empty() {
            return Err(invalid("description is required".into()));
        }
        let ty = ty.parse::<ArgType>().map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            name: base.to_string(),
            ty,
            description: description.to_string(),
            variadic,
        })
    }

    /// Usage form such as `<target:string>` or `[extra:string...]`.
    pub fn usage(&self) -> String {
        if self.variadic {
            format!("[{}:{}{}]", self.name, self.ty, VARIADIC_SUFFIX)
        } else {
            format!("<{}:{}>", self.name, self.ty)
        }
    }
}

impl fmt::Display for PositionalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.usage())
    }
}

/// The ordered declarations of one target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionalSpecs {
    specs: Vec<PositionalSpec>,
}

impl PositionalSpecs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgumentSpec` when a variadic declaration is already
    /// present, since nothing may follow it.
    pub fn push(&mut self, spec: PositionalSpec) -> Result<(), ArgumentSpecError> {
        if let Some(last) = self.specs.last() {
            if last.variadic {
                return Err(ArgumentSpecError::InvalidArgumentSpec {
                    name: spec.name,
                    reason: format!(
                        "cannot follow variadic argument '{}{}'",
                        last.name, VARIADIC_SUFFIX
                    ),
                });
            }
        }
        self.specs.push(spec);
        Ok(())
    }

    /// The trailing variadic declaration, if any.
    pub fn variadic(&self) -> Option<&PositionalSpec> {
        self.specs.last().filter(|s| s.variadic)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PositionalSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Usage line for all declarations.
    pub fn usage(&self) -> String {
        self.specs
            .iter()
            .map(PositionalSpec::usage)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<'a> IntoIterator for &'a PositionalSpecs {
    type Item = &'a PositionalSpec;
    type IntoIter = std::slice::Iter<'a, PositionalSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}
