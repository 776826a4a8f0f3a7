//! target::external
//!
//! Targets defined by TOML files.
//!
//! # Format
//!
//! ```toml
//! description = "Deploy the application"
//!
//! [[flag]]
//! short = "v"
//! long = "verbose"
//! description = "Print every step"
//! priority = 0
//!
//! [[flag]]
//! long = "region"
//! description = "Region to deploy to"
//! priority = 1
//! argument = { name = "region", type = "string", description = "Region name" }
//!
//! [[argument]]
//! name = "service"
//! type = "string"
//! description = "Service to deploy"
//!
//! [[argument]]
//! name = "hosts..."
//! type = "string"
//! description = "Hosts to deploy to"
//!
//! [handlers]
//! target_deploy = ["./deploy.sh", "--"]
//! ```
//!
//! # Execution
//!
//! The bound command runs with the resolved positional arguments appended.
//! Every flag executed during the dispatch, common flags included, is
//! exported to the child as `FLAG_NAME_<NORMALIZED>`, holding the flag's
//! argument or `1`. `FLAG_NAME_*` variables inherited from the parent are
//! removed first, so a target that runs `fw` again starts clean. Commands
//! starting with `./` or `../` resolve against the definition's directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context as _;
use serde::Deserialize;
use thiserror::Error;

use super::{Registration, TargetError};
use crate::core::flag::{FlagSpec, MAX_PRIORITY};
use crate::core::naming::{flag_env_var, FLAG_ENV_PREFIX};
use crate::core::registry::RegistryError;
use crate::core::types::{ArgType, ShortForm};
use crate::engine::Session;

/// File extension of definition files.
pub const EXTENSION: &str = "toml";

/// An external command exited unsuccessfully.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("command '{program}' exited with {}", describe_status(.code))]
pub struct CommandFailed {
    pub program: String,
    pub code: Option<i32>,
}

fn describe_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TargetFile {
    description: Option<String>,
    #[serde(rename = "flag")]
    flags: Vec<FlagDecl>,
    #[serde(rename = "argument")]
    arguments: Vec<ArgumentDecl>,
    handlers: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FlagDecl {
    short: Option<String>,
    long: String,
    description: Option<String>,
    priority: Option<i64>,
    argument: Option<FlagArgumentDecl>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FlagArgumentDecl {
    name: Option<String>,
    #[serde(rename = "type")]
    ty: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ArgumentDecl {
    name: Option<String>,
    #[serde(rename = "type")]
    ty: Option<String>,
    description: Option<String>,
}

impl FlagDecl {
    fn into_spec(self) -> Result<FlagSpec, RegistryError> {
        let flag = self.long;
        let invalid = |reason: String| RegistryError::InvalidFlagSpec {
            flag: flag.clone(),
            reason,
        };

        let short = match self.short.as_deref().map(ShortForm::parse) {
            Some(Ok(short)) => short.map(|s| s.as_char()),
            Some(Err(e)) => return Err(invalid(e.to_string())),
            None => None,
        };
        let description = self
            .description
            .ok_or_else(|| invalid("description is required".into()))?;
        let priority = match self.priority {
            None => return Err(invalid("priority is required".into())),
            Some(p) => u8::try_from(p)
                .ok()
                .filter(|p| *p <= MAX_PRIORITY)
                .ok_or_else(|| {
                    invalid(format!("priority {} is outside 0..={}", p, MAX_PRIORITY))
                })?,
        };

        let mut spec = FlagSpec::new(flag.clone(), description, priority);
        spec.short = short;

        if let Some(arg) = self.argument {
            let ty = arg
                .ty
                .ok_or_else(|| invalid("argument type is required".into()))?
                .parse::<ArgType>()
                .map_err(|e| invalid(e.to_string()))?;
            let description = arg
                .description
                .ok_or_else(|| invalid("argument description is required".into()))?;
            let name = arg
                .name
                .ok_or_else(|| invalid("argument name is required".into()))?;
            spec = spec.argument(name, ty, description);
        }

        Ok(spec)
    }
}

fn read(path: &Path) -> Result<TargetFile, TargetError> {
    let load_error = |message: String| TargetError::Load {
        path: path.to_path_buf(),
        message,
    };
    let contents = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
    toml::from_str(&contents).map_err(|e| load_error(e.to_string()))
}

/// The description of a definition file, if it parses.
pub fn describe(path: &Path) -> Option<String> {
    read(path).ok().map(|file| file.description.unwrap_or_default())
}

/// Register the target defined at `path`.
///
/// # Errors
///
/// - `Load` if the file cannot be read or parsed, or binds an empty command
/// - `Registry` / `ArgumentSpec` for invalid declarations
pub fn register(path: &Path, reg: &mut Registration<'_>) -> Result<(), TargetError> {
    let file = read(path)?;
    let base = path.parent().map(Path::to_path_buf).unwrap_or_default();

    if let Some(description) = file.description {
        reg.describe(description);
    }

    for decl in file.flags {
        reg.add_flag(decl.into_spec()?)?;
    }

    for decl in file.arguments {
        reg.add_argument(
            decl.name.as_deref().unwrap_or(""),
            decl.ty.as_deref().unwrap_or(""),
            decl.description.as_deref().unwrap_or(""),
        )?;
    }

    for (identifier, argv) in file.handlers {
        if argv.is_empty() {
            return Err(TargetError::Load {
                path: path.to_path_buf(),
                message: format!("handler '{}' has an empty command", identifier),
            });
        }
        reg.bind(identifier, command_handler(argv, base.clone()));
    }

    Ok(())
}

/// A handler that runs `argv` followed by the positional arguments.
pub fn command_handler(
    argv: Vec<String>,
    base: PathBuf,
) -> impl Fn(&mut Session, &[String]) -> anyhow::Result<()> {
    move |session: &mut Session, args: &[String]| {
        let (program, fixed) = argv.split_first().context("empty command")?;
        let executable = if program.starts_with("./") || program.starts_with("../") {
            base.join(program)
        } else {
            PathBuf::from(program)
        };

        let mut command = Command::new(&executable);
        command.args(fixed).args(args);
        for (key, _) in std::env::vars_os() {
            if key.to_string_lossy().starts_with(FLAG_ENV_PREFIX) {
                command.env_remove(key);
            }
        }
        for (flag, value) in session.recorded() {
            command.env(flag_env_var(flag), value.unwrap_or("1"));
        }

        let status = command
            .status()
            .with_context(|| format!("failed to run '{}'", executable.display()))?;
        if !status.success() {
            return Err(CommandFailed {
                program: program.clone(),
                code: status.code(),
            }
            .into());
        }
        Ok(())
    }
}
