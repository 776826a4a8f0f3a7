//! core::types
//!
//! Strong types for flag and argument declarations.
//!
//! # Types
//!
//! - [`ArgType`] - Declared type of a flag argument or positional argument
//! - [`ShortForm`] - Validated single-character short flag
//!
//! # Classification
//!
//! Raw tokens are never rejected by [`classify`]; every token is at least a
//! [`ArgType::String`]. Declared types are then checked against the inferred
//! one with [`ArgType::accepts`].
//!
//! # Examples
//!
//! ```
//! use flagwork::core::types::{classify, ArgType};
//!
//! assert_eq!(classify("42"), ArgType::Int);
//! assert_eq!(classify("-4.2"), ArgType::Float);
//! assert_eq!(classify("four"), ArgType::String);
//!
//! assert!(ArgType::String.accepts(ArgType::Int));
//! assert!(!ArgType::Int.accepts(ArgType::Float));
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());

static FLOAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+\.?[0-9]*$").unwrap());

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown argument type '{0}', must be one of: any, int, float, string")]
    UnknownArgType(String),

    #[error("invalid short form '{0}': must be a single character other than '-'")]
    InvalidShortForm(String),
}

/// Declared type of an argument.
///
/// `Any` and `String` accept every inferred type. `Int` and `Float` require
/// the inferred type to match exactly, so a `Float` argument rejects `5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ArgType {
    Any,
    Int,
    Float,
    String,
}

impl ArgType {
    /// Lowercase name used in declarations and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgType::Any => "any",
            ArgType::Int => "int",
            ArgType::Float => "float",
            ArgType::String => "string",
        }
    }

    /// Whether a value whose inferred type is `inferred` satisfies this
    /// declared type.
    pub fn accepts(&self, inferred: ArgType) -> bool {
        match self {
            ArgType::Any | ArgType::String => true,
            ArgType::Int | ArgType::Float => *self == inferred,
        }
    }

    /// Whether values of this type need to be classified at all.
    pub fn is_checked(&self) -> bool {
        matches!(self, ArgType::Int | ArgType::Float)
    }
}

impl FromStr for ArgType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(ArgType::Any),
            "int" => Ok(ArgType::Int),
            "float" => Ok(ArgType::Float),
            "string" => Ok(ArgType::String),
            other => Err(TypeError::UnknownArgType(other.to_string())),
        }
    }
}

impl TryFrom<String> for ArgType {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArgType> for String {
    fn from(ty: ArgType) -> Self {
        ty.as_str().to_string()
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a raw token.
///
/// Integer shapes are tested before float shapes, so `"12"` is `Int` and
/// never `Float`. Signed integers such as `"-3"` fall through to `Float`.
pub fn classify(token: &str) -> ArgType {
    if INT_RE.is_match(token) {
        ArgType::Int
    } else if FLOAT_RE.is_match(token) {
        ArgType::Float
    } else {
        ArgType::String
    }
}

/// A validated single-character short flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortForm(char);

impl ShortForm {
    /// Create a short form from a character.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidShortForm` for `-` and whitespace.
    pub fn new(c: char) -> Result<Self, TypeError> {
        if c == '-' || c.is_whitespace() || c.is_control() {
            return Err(TypeError::InvalidShortForm(c.to_string()));
        }
        Ok(Self(c))
    }

    /// Parse a textual short form.
    ///
    /// An empty string or the `-` sentinel means "no short form".
    pub fn parse(s: &str) -> Result<Option<Self>, TypeError> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Ok(None),
            (Some('-'), None) => Ok(None),
            (Some(c), None) => Self::new(c).map(Some),
            _ => Err(TypeError::InvalidShortForm(s.to_string())),
        }
    }

    pub fn as_char(&self) -> char {
        self.0
    }
}

impl fmt::Display for ShortForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-{}", self.0)
    }
}
