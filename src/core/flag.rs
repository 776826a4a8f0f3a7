//! core::flag
//!
//! Flag declarations.
//!
//! A [`FlagSpec`] is a plain structured record: long name, optional short
//! form, description, priority and an optional typed argument. Specs are
//! built with a small builder and validated when they are registered.
//!
//! # Example
//!
//! ```
//! use flagwork::core::flag::FlagSpec;
//! use flagwork::core::types::ArgType;
//!
//! let spec = FlagSpec::new("out", "Write output to a path", 1)
//!     .short('o')
//!     .argument("path", ArgType::String, "Destination path");
//!
//! assert!(spec.validate().is_ok());
//! assert_eq!(spec.identifier(), "flag_name_out");
//! ```

use std::fmt;

use super::naming::flag_identifier;
use super::registry::RegistryError;
use super::types::{ArgType, ShortForm};

/// Highest priority a flag may declare. Priorities run `0..=MAX_PRIORITY`.
pub const MAX_PRIORITY: u8 = 9;

/// The typed argument a flag consumes from the argument stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagArgument {
    pub name: String,
    pub ty: ArgType,
    pub description: String,
}

/// A declared flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    /// Single-character short form, if any.
    pub short: Option<char>,
    /// Unique long name, without leading dashes.
    pub long: String,
    pub description: String,
    /// Execution priority, lower runs first.
    pub priority: u8,
    pub argument: Option<FlagArgument>,
}

impl FlagSpec {
    /// Create a flag with no short form and no argument.
    pub fn new(long: impl Into<String>, description: impl Into<String>, priority: u8) -> Self {
        Self {
            short: None,
            long: long.into(),
            description: description.into(),
            priority,
            argument: None,
        }
    }

    /// Set the short form.
    pub fn short(mut self, c: char) -> Self {
        self.short = Some(c);
        self
    }

    /// Declare an argument consumed by this flag.
    pub fn argument(
        mut self,
        name: impl Into<String>,
        ty: ArgType,
        description: impl Into<String>,
    ) -> Self {
        self.argument = Some(FlagArgument {
            name: name.into(),
            ty,
            description: description.into(),
        });
        self
    }

    /// Identifier the flag's handler is known by.
    pub fn identifier(&self) -> String {
        flag_identifier(&self.long)
    }

    /// Check field-level invariants.
    ///
    /// Uniqueness is checked by the registry, not here.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidFlagSpec` describing the first
    /// violated rule.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let invalid = |reason: String| RegistryError::InvalidFlagSpec {
            flag: self.long.clone(),
            reason,
        };

        if self.long.is_empty() {
            return Err(invalid("long name cannot be empty".into()));
        }
        if self.long.starts_with('-') {
            return Err(invalid("long name cannot start with '-'".into()));
        }
        if self.long.chars().any(char::is_whitespace) {
            return Err(invalid("long name cannot contain whitespace".into()));
        }
        if let Some(c) = self.short {
            ShortForm::new(c).map_err(|e| invalid(e.to_string()))?;
        }
        if self.description.trim().is_empty() {
            return Err(invalid("description is required".into()));
        }
        if self.priority > MAX_PRIORITY {
            return Err(invalid(format!(
                "priority {} is outside 0..={}",
                self.priority, MAX_PRIORITY
            )));
        }
        if let Some(arg) = &self.argument {
            if arg.name.trim().is_empty() {
                return Err(invalid("argument name is required".into()));
            }
            if arg.description.trim().is_empty() {
                return Err(invalid(format!(
                    "argument '{}' needs a description",
                    arg.name
                )));
            }
        }
        Ok(())
    }

    /// Usage form such as `-o, --out <path:string>`.
    pub fn usage(&self) -> String {
        let mut out = match self.short {
            Some(c) => format!("-{}, --{}", c, self.long),
            None => format!("    --{}", self.long),
        };
        if let Some(arg) = &self.argument {
            out.push_str(&format!(" <{}:{}>", arg.name, arg.ty));
        }
        out
    }
}

impl fmt::Display for FlagSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{}", self.long)
    }
}
