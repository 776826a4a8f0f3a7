//! target
//!
//! Target registration and lookup.
//!
//! # Registration Protocol
//!
//! Loading a target runs its registration against a [`Registration`], which
//! collects:
//!
//! - flags, written straight into the active flag registry
//! - positional argument declarations, in order
//! - a description
//! - handlers, bound under identifiers
//!
//! After registration the dispatcher takes the handler bound under
//! `target_<normalized-name>`. A target that binds nothing there fails with
//! [`TargetError::TargetHandlerMissing`].
//!
//! # Sources
//!
//! - [`builtin`] - registration closures compiled into the host
//! - [`external`] - `<name>.toml` definition files in target directories
//!
//! Builtins are consulted first, then target directories in order.

pub mod builtin;
pub mod external;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;

use crate::core::flag::FlagSpec;
use crate::core::naming::target_identifier;
use crate::core::positional::{ArgumentSpecError, PositionalSpec, PositionalSpecs};
use crate::core::registry::RegistryError;
use crate::engine::{flag_handler, target_handler, Registry, Session, TargetHandler};

/// Errors from resolving and registering targets.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("unknown target '{0}' (run with --help to list targets)")]
    UnknownTarget(String),

    #[error("target '{target}' does not bind a handler named '{identifier}'")]
    TargetHandlerMissing { target: String, identifier: String },

    #[error("failed to load target definition '{path}': {message}")]
    Load { path: PathBuf, message: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    ArgumentSpec(#[from] ArgumentSpecError),
}

/// A builtin target's registration function.
pub type RegisterFn = Rc<dyn Fn(&mut Registration<'_>) -> Result<(), TargetError>>;

/// Collects the declarations of one target while it registers.
pub struct Registration<'a> {
    target: &'a str,
    registry: &'a mut Registry,
    positionals: PositionalSpecs,
    description: String,
    handlers: HashMap<String, TargetHandler>,
}

impl<'a> Registration<'a> {
    pub fn new(target: &'a str, registry: &'a mut Registry) -> Self {
        Self {
            target,
            registry,
            positionals: PositionalSpecs::new(),
            description: String::new(),
            handlers: HashMap::new(),
        }
    }

    /// Name of the target being registered.
    pub fn target(&self) -> &str {
        self.target
    }

    /// Register a flag with no handler of its own.
    ///
    /// The executor records every flag it runs, so the flag is still visible
    /// through [`Session::is_set`] and [`Session::value`].
    pub fn add_flag(&mut self, spec: FlagSpec) -> Result<&mut Self, TargetError> {
        self.add_flag_with(spec, |_, _| Ok(()))
    }

    /// Register a flag with its own handler.
    pub fn add_flag_with<F>(&mut self, spec: FlagSpec, handler: F) -> Result<&mut Self, TargetError>
    where
        F: Fn(&mut Session, Option<&str>) -> anyhow::Result<()> + 'static,
    {
        self.registry.register(spec, flag_handler(handler))?;
        Ok(self)
    }

    /// Declare the next positional argument.
    ///
    /// A name ending in `...` declares the trailing variadic argument. The
    /// type is one of `any`, `int`, `float`, `string`.
    pub fn add_argument(
        &mut self,
        name: &str,
        ty: &str,
        description: &str,
    ) -> Result<&mut Self, TargetError> {
        self.positionals
            .push(PositionalSpec::declare(name, ty, description)?)?;
        Ok(self)
    }

    pub fn describe(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    /// Bind a handler under an explicit identifier.
    pub fn bind<F>(&mut self, identifier: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut Session, &[String]) -> anyhow::Result<()> + 'static,
    {
        self.handlers
            .insert(identifier.into(), target_handler(handler));
        self
    }

    /// Bind the target's handler under its expected identifier.
    pub fn handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Session, &[String]) -> anyhow::Result<()> + 'static,
    {
        let identifier = target_identifier(self.target);
        self.bind(identifier, handler)
    }

    /// Close registration and pick out the target handler.
    fn finish(mut self, is_builtin: bool) -> Result<LoadedTarget, TargetError> {
        let identifier = target_identifier(self.target);
        let handler = self.handlers.remove(&identifier).ok_or_else(|| {
            TargetError::TargetHandlerMissing {
                target: self.target.to_string(),
                identifier,
            }
        })?;

        Ok(LoadedTarget {
            name: self.target.to_string(),
            description: self.description,
            positionals: self.positionals,
            handler,
            is_builtin,
        })
    }
}

/// A registered target, ready for dispatch.
#[derive(Clone)]
pub struct LoadedTarget {
    pub name: String,
    pub description: String,
    pub positionals: PositionalSpecs,
    pub handler: TargetHandler,
    pub is_builtin: bool,
}

impl fmt::Debug for LoadedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedTarget")
            .field("name", &self.name)
            .field("positionals", &self.positionals)
            .field("is_builtin", &self.is_builtin)
            .finish_non_exhaustive()
    }
}

/// Where a target's registration comes from.
#[derive(Clone)]
pub enum TargetSource {
    Builtin(RegisterFn),
    External(PathBuf),
}

/// One line of the target listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSummary {
    pub name: String,
    pub description: String,
    pub is_builtin: bool,
}

#[derive(Clone)]
struct Builtin {
    summary: String,
    register: RegisterFn,
}

/// All targets known to the host.
#[derive(Clone, Default)]
pub struct TargetCatalog {
    builtins: BTreeMap<String, Builtin>,
    dirs: Vec<PathBuf>,
}

impl TargetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory searched for `<name>.toml` definitions.
    pub fn add_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.dirs.push(dir.into());
        self
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Add a builtin target.
    ///
    /// `summary` is shown in the target listing; the full description is
    /// whatever the registration sets.
    pub fn builtin<F>(&mut self, name: &str, summary: &str, register: F) -> &mut Self
    where
        F: Fn(&mut Registration<'_>) -> Result<(), TargetError> + 'static,
    {
        self.builtins.insert(
            name.to_string(),
            Builtin {
                summary: summary.to_string(),
                register: Rc::new(register),
            },
        );
        self
    }

    /// Find where a target is defined.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTarget` if no builtin and no definition file exist.
    pub fn resolve(&self, name: &str) -> Result<TargetSource, TargetError> {
        if let Some(builtin) = self.builtins.get(name) {
            return Ok(TargetSource::Builtin(builtin.register.clone()));
        }

        if is_file_name_safe(name) {
            if let Some(path) = self.definition_path(name) {
                return Ok(TargetSource::External(path));
            }
        }

        Err(TargetError::UnknownTarget(name.to_string()))
    }

    /// Resolve and register a target into `registry`.
    pub fn load(&self, name: &str, registry: &mut Registry) -> Result<LoadedTarget, TargetError> {
        let source = self.resolve(name)?;
        let mut registration = Registration::new(name, registry);
        let is_builtin = match source {
            TargetSource::Builtin(register) => {
                register(&mut registration)?;
                true
            }
            TargetSource::External(path) => {
                external::register(&path, &mut registration)?;
                false
            }
        };
        registration.finish(is_builtin)
    }

    /// Every known target, sorted by name.
    ///
    /// Definition files shadowed by a builtin or by an earlier directory are
    /// not listed.
    pub fn list(&self) -> Vec<TargetSummary> {
        let mut targets: BTreeMap<String, TargetSummary> = self
            .builtins
            .iter()
            .map(|(name, builtin)| {
                let summary = TargetSummary {
                    name: name.clone(),
                    description: builtin.summary.clone(),
                    is_builtin: true,
                };
                (name.clone(), summary)
            })
            .collect();

        for dir in &self.dirs {
            for (name, path) in definitions_in(dir) {
                targets.entry(name.clone()).or_insert_with(|| TargetSummary {
                    name,
                    description: external::describe(&path)
                        .unwrap_or_else(|| "(invalid definition)".to_string()),
                    is_builtin: false,
                });
            }
        }

        targets.into_values().collect()
    }

    fn definition_path(&self, name: &str) -> Option<PathBuf> {
        self.dirs
            .iter()
            .map(|dir| dir.join(format!("{}.{}", name, external::EXTENSION)))
            .find(|path| path.is_file())
    }
}

/// Target names map to file names; refuse anything that could escape the
/// target directory.
fn is_file_name_safe(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.starts_with('-')
        && !name.contains(['/', '\\'])
}

/// `(name, path)` of every definition file in `dir`, sorted by name.
fn definitions_in(dir: &Path) -> Vec<(String, PathBuf)> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut found: Vec<(String, PathBuf)> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(external::EXTENSION)
        })
        .filter_map(|path| {
            let name = path.file_stem()?.to_str()?.to_string();
            is_file_name_safe(&name).then_some((name, path))
        })
        .collect();
    found.sort();
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn build_target(reg: &mut Registration<'_>) -> Result<(), TargetError> {
        reg.describe("Build things")
            .add_flag(FlagSpec::new("verbose", "Be loud", 0).short('v'))?
            .add_argument("target", "string", "What to build")?
            .add_argument("extra...", "string", "More")?;
        reg.handler(|_, _| Ok(()));
        Ok(())
    }

    fn catalog() -> TargetCatalog {
        let mut catalog = TargetCatalog::new();
        catalog.builtin("build", "Build things", build_target);
        catalog.builtin("broken", "No handler", |reg| {
            reg.describe("Binds the wrong identifier");
            reg.bind("target_other", |_, _| Ok(()));
            Ok(())
        });
        catalog
    }

    #[test]
    fn load_builtin_populates_registry() {
        let mut registry = Registry::new();
        let target = catalog().load("build", &mut registry).unwrap();

        assert!(target.is_builtin);
        assert_eq!(target.description, "Build things");
        assert_eq!(target.positionals.len(), 2);
        assert!(registry.lookup('v').is_some());
    }

    #[test]
    fn missing_handler_detected() {
        let mut registry = Registry::new();
        let err = catalog().load("broken", &mut registry).unwrap_err();

        assert!(matches!(
            err,
            TargetError::TargetHandlerMissing { ref identifier, .. } if identifier == "target_broken"
        ));
    }

    #[test]
    fn unknown_target() {
        let mut registry = Registry::new();
        let err = catalog().load("deploy", &mut registry).unwrap_err();
        assert!(matches!(err, TargetError::UnknownTarget(ref name) if name == "deploy"));
    }

    #[test]
    fn registration_errors_propagate() {
        let mut catalog = TargetCatalog::new();
        catalog.builtin("dup", "Duplicate flags", |reg| {
            reg.add_flag(FlagSpec::new("x", "one", 0))?
                .add_flag(FlagSpec::new("x", "two", 0))?;
            reg.handler(|_, _| Ok(()));
            Ok(())
        });

        let err = catalog.load("dup", &mut Registry::new()).unwrap_err();
        assert!(matches!(
            err,
            TargetError::Registry(RegistryError::DuplicateFlagName(_))
        ));
    }

    #[test]
    fn unsafe_names_never_reach_the_filesystem() {
        let temp = TempDir::new().unwrap();
        let mut catalog = TargetCatalog::new();
        catalog.add_dir(temp.path().join("targets"));

        for name in ["../secret", ".hidden", "a/b", ""] {
            assert!(matches!(
                catalog.resolve(name),
                Err(TargetError::UnknownTarget(_))
            ));
        }
    }

    #[test]
    fn list_merges_builtins_and_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("deploy.toml"),
            "description = \"Ship it\"\n[handlers]\ntarget_deploy = [\"true\"]\n",
        )
        .unwrap();
        std::fs::write(temp.path().join("build.toml"), "description = \"Shadowed\"\n").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let mut catalog = catalog();
        catalog.add_dir(temp.path());
        let listed = catalog.list();

        let names: Vec<_> = listed.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["broken", "build", "deploy"]);
        assert_eq!(listed[1].description, "Build things");
        assert_eq!(listed[2].description, "Ship it");
        assert!(!listed[2].is_builtin);
    }
}
