//! engine::runner
//!
//! The dispatcher - the single entry point for running a target.
//!
//! # Lifecycle
//!
//! ```text
//! common flags -> SelectingTarget -> Registering -> ParsingFlags
//!   -> ExecutingFlags -> deps -> ResolvingPositionals -> Invoking -> Done
//! ```
//!
//! Flags given before the target name are parsed against the common flags
//! and run before the target is even selected. An empty argument vector, or
//! a halt requested by any handler, ends the dispatch with rendered help
//! instead of an error, and without checking dependencies.
//!
//! Dependencies are checked once every flag has run, so `--ignore-deps`
//! works on either side of the target name, and before any positional is
//! resolved or the target handler runs.
//!
//! # Invariants
//!
//! - The registry is reset before every registration, including the nested
//!   one performed for detailed help, unless preserve mode is on
//! - Common flags are present in every registry
//! - A failure in any phase aborts the dispatch; nothing is retried

use std::fmt;

use thiserror::Error;

use super::deps::{self, DependencyError};
use super::parse::{parse_flags, ArgError};
use super::resolve::resolve_positionals;
use super::schedule::{execute, schedule, FlagFailed};
use super::stream::ArgStream;
use super::{flag_handler, FlagHandler, Halt, Modes, Registry, Session};
use crate::core::config::Config;
use crate::core::flag::FlagSpec;
use crate::core::registry::RegistryError;
use crate::target::builtin::{self, HELP_TARGET};
use crate::target::external::CommandFailed;
use crate::target::{LoadedTarget, TargetCatalog, TargetError};
use crate::ui::{help, output};

/// Exit status for handler failures.
pub const EXIT_FAILURE: i32 = 1;
/// Exit status for invalid invocations.
pub const EXIT_USAGE: i32 = 2;
/// Exit status for invalid flag, argument or target definitions.
pub const EXIT_DEFINITION: i32 = 3;
/// Exit status for a missing dependency.
pub const EXIT_DEPENDENCY: i32 = 4;

/// Dispatcher states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    SelectingTarget,
    Registering,
    ParsingFlags,
    ExecutingFlags,
    ResolvingPositionals,
    Invoking,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::SelectingTarget => "selecting target",
            Phase::Registering => "registering",
            Phase::ParsingFlags => "parsing flags",
            Phase::ExecutingFlags => "executing flags",
            Phase::ResolvingPositionals => "resolving positionals",
            Phase::Invoking => "invoking",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// How a successful dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The target handler ran to completion.
    Completed { target: String },
    /// Help was requested; the text is ready to print.
    Help(String),
}

/// Errors from the dispatcher.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Args(#[from] ArgError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Dependency(#[from] DependencyError),

    #[error(transparent)]
    Flag(#[from] FlagFailed),

    #[error("target '{target}' failed: {cause:#}")]
    Handler { target: String, cause: anyhow::Error },
}

impl RunError {
    /// Process exit status for this error.
    ///
    /// A handler failing with an [`ArgError`] is a usage error. External
    /// commands that fail pass their own status through.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Args(_) | RunError::Target(TargetError::UnknownTarget(_)) => EXIT_USAGE,
            RunError::Registry(_) | RunError::Target(_) => EXIT_DEFINITION,
            RunError::Dependency(_) => EXIT_DEPENDENCY,
            RunError::Flag(_) => EXIT_FAILURE,
            RunError::Handler { cause, .. } if cause.is::<ArgError>() => EXIT_USAGE,
            RunError::Handler { cause, .. } => cause
                .downcast_ref::<CommandFailed>()
                .and_then(|failed| failed.code)
                .filter(|code| *code != 0)
                .unwrap_or(EXIT_FAILURE),
        }
    }
}

/// Registers targets and dispatches argument vectors to them.
pub struct Engine {
    program: String,
    catalog: TargetCatalog,
    common_flags: Vec<(FlagSpec, FlagHandler)>,
    dependencies: Vec<String>,
    modes: Modes,
    registry: Registry,
    session: Session,
    phase: Phase,
}

impl Engine {
    /// Create an engine with the builtin flags and the `help` target.
    pub fn new(program: impl Into<String>) -> Self {
        let mut catalog = TargetCatalog::new();
        catalog.builtin(
            HELP_TARGET,
            "Show the target list, or detailed help for one target",
            builtin::register_help,
        );

        Self {
            program: program.into(),
            catalog,
            common_flags: builtin::builtin_flags(),
            dependencies: Vec::new(),
            modes: Modes::default(),
            registry: Registry::new(),
            session: Session::default(),
            phase: Phase::Done,
        }
    }

    /// Create an engine seeded from configuration.
    ///
    /// Config supplies target directories, dependencies and initial modes.
    pub fn with_config(program: impl Into<String>, config: &Config) -> Self {
        let mut engine = Self::new(program);
        for dir in config.target_dirs() {
            engine.catalog.add_dir(dir);
        }
        engine.dependencies = config.dependencies();
        engine.set_modes(Modes {
            preserve_flags: config.preserve_flags(),
            ignore_deps: config.ignore_deps(),
            debug: config.debug(),
        });
        engine
    }

    pub fn catalog(&self) -> &TargetCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut TargetCatalog {
        &mut self.catalog
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Modes every dispatch starts from. Mode flags override them for one
    /// dispatch only.
    pub fn set_modes(&mut self, modes: Modes) -> &mut Self {
        self.modes = modes;
        self.session.modes = modes;
        self
    }

    /// The registry as left by the last dispatch.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The phase the last dispatch reached.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Require an executable to be on `PATH`.
    pub fn require(&mut self, executable: impl Into<String>) -> &mut Self {
        self.dependencies.push(executable.into());
        self
    }

    /// Add a flag accepted before the target name and by every target.
    ///
    /// # Errors
    ///
    /// Returns a `RegistryError` if the flag is invalid or collides with
    /// another common flag.
    pub fn common_flag<F>(&mut self, spec: FlagSpec, handler: F) -> Result<&mut Self, RegistryError>
    where
        F: Fn(&mut Session, Option<&str>) -> anyhow::Result<()> + 'static,
    {
        let handler = flag_handler(handler);
        let mut scratch = Registry::new();
        for (existing, existing_handler) in &self.common_flags {
            scratch.register(existing.clone(), existing_handler.clone())?;
        }
        scratch.register(spec.clone(), handler.clone())?;

        self.common_flags.push((spec, handler));
        Ok(self)
    }

    /// Run one argument vector (without the program name) to completion.
    ///
    /// # Errors
    ///
    /// Returns the first error of any phase. Help requests are not errors;
    /// they produce [`Outcome::Help`].
    pub fn dispatch<I, S>(&mut self, args: I) -> Result<Outcome, RunError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut stream = ArgStream::new(args);
        self.session.clear();
        self.session.modes = self.modes;
        self.registry.reset(true, false);
        self.install_common_flags()?;

        self.run_flags(&mut stream)?;
        if let Some(halt) = self.session.take_halt() {
            return self.render(halt);
        }

        self.enter(Phase::SelectingTarget);
        let Some(name) = stream.pop() else {
            return self.render(Halt::Summary);
        };

        self.enter(Phase::Registering);
        let target = self.register_target(&name)?;

        self.run_flags(&mut stream)?;
        if let Some(halt) = self.session.take_halt() {
            return self.render(halt);
        }
        self.check_dependencies()?;

        self.enter(Phase::ResolvingPositionals);
        let values = resolve_positionals(&mut stream, &target.positionals)?;

        self.enter(Phase::Invoking);
        (target.handler)(&mut self.session, &values).map_err(|cause| RunError::Handler {
            target: name.clone(),
            cause,
        })?;
        if let Some(halt) = self.session.take_halt() {
            return self.render(halt);
        }

        self.enter(Phase::Done);
        Ok(Outcome::Completed { target: name })
    }

    /// Parse leading flags and run them by priority.
    fn run_flags(&mut self, stream: &mut ArgStream) -> Result<(), RunError> {
        self.enter(Phase::ParsingFlags);
        let pending = parse_flags(stream, &self.registry)?;

        self.enter(Phase::ExecutingFlags);
        execute(&schedule(pending), &mut self.session)?;
        Ok(())
    }

    /// Fail on the first missing dependency unless `--ignore-deps` ran.
    fn check_dependencies(&self) -> Result<(), DependencyError> {
        if self.session.modes.ignore_deps {
            self.debug("dependency check skipped");
            return Ok(());
        }
        deps::check(&self.dependencies)
    }

    /// Reset the registry (honoring preserve mode) and register a target.
    fn register_target(&mut self, name: &str) -> Result<LoadedTarget, RunError> {
        let cleared = self
            .registry
            .reset(false, self.session.modes.preserve_flags);
        if !cleared {
            self.debug(format!(
                "preserve mode: keeping {} registered flags",
                self.registry.len()
            ));
        }
        self.install_common_flags()?;

        let target = self.catalog.load(name, &mut self.registry)?;
        self.debug(format!(
            "registered target '{}' ({}, {} flags, {} positionals)",
            target.name,
            if target.is_builtin { "builtin" } else { "external" },
            self.registry.len(),
            target.positionals.len()
        ));
        Ok(target)
    }

    /// Register every common flag not already present.
    fn install_common_flags(&mut self) -> Result<(), RegistryError> {
        for (spec, handler) in &self.common_flags {
            if !self.registry.contains(&spec.long) {
                self.registry.register(spec.clone(), handler.clone())?;
            }
        }
        Ok(())
    }

    fn common_specs(&self) -> Vec<&FlagSpec> {
        let mut specs: Vec<&FlagSpec> = self.common_flags.iter().map(|(spec, _)| spec).collect();
        specs.sort_by(|a, b| a.long.cmp(&b.long));
        specs
    }

    fn render(&mut self, halt: Halt) -> Result<Outcome, RunError> {
        let text = match halt {
            Halt::Summary => help::summary(&self.program, &self.catalog.list(), &self.common_specs()),
            Halt::TargetHelp(name) => {
                self.enter(Phase::Registering);
                let target = self.register_target(&name)?;
                let common = self.common_specs();
                let own: Vec<&FlagSpec> = self
                    .registry
                    .specs()
                    .into_iter()
                    .filter(|spec| !common.iter().any(|c| c.long == spec.long))
                    .collect();
                help::target_detail(&self.program, &target, &own, &common)
            }
        };

        self.enter(Phase::Done);
        Ok(Outcome::Help(text))
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.debug(format!("phase: {}", phase));
    }

    fn debug(&self, message: impl fmt::Display) {
        output::debug(message, self.session.verbosity());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::core::types::ArgType;

    /// Engine with a `build` target that records what it received.
    fn engine(calls: Rc<RefCell<Vec<Vec<String>>>>) -> Engine {
        let mut engine = Engine::new("tool");
        engine.catalog_mut().builtin("build", "Build things", move |reg| {
            reg.describe("Build the given target")
                .add_flag(FlagSpec::new("verbose", "Be loud", 0).short('v'))?
                .add_flag(
                    FlagSpec::new("out", "Output path", 1)
                        .short('o')
                        .argument("path", ArgType::String, "Destination"),
                )?
                .add_argument("target", "string", "What to build")?
                .add_argument("extra...", "string", "More targets")?;
            let calls = calls.clone();
            reg.handler(move |_, args| {
                calls.borrow_mut().push(args.to_vec());
                Ok(())
            });
            Ok(())
        });
        engine
    }

    #[test]
    fn full_dispatch() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut engine = engine(calls.clone());

        let outcome = engine
            .dispatch(["build", "-v", "--out", "/tmp", "a", "b", "c"])
            .unwrap();

        assert_eq!(outcome, Outcome::Completed { target: "build".into() });
        assert_eq!(calls.borrow()[0], vec!["a", "b", "c"]);
        assert!(engine.session().is_set("verbose"));
        assert_eq!(engine.session().value("out"), Some("/tmp"));
        assert_eq!(engine.phase(), Phase::Done);
    }

    #[test]
    fn empty_args_render_summary() {
        let mut engine = engine(Rc::default());

        let Outcome::Help(text) = engine.dispatch(Vec::<String>::new()).unwrap() else {
            panic!("expected help");
        };

        assert!(text.contains("build"));
        assert!(text.contains("--help-target"));
    }

    #[test]
    fn help_flag_after_target_halts_before_positionals() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut engine = engine(calls.clone());

        let outcome = engine.dispatch(["build", "-h"]).unwrap();

        assert!(matches!(outcome, Outcome::Help(_)));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn help_target_renders_target_flags() {
        let mut engine = engine(Rc::default());

        let Outcome::Help(text) = engine.dispatch(["--help-target", "build"]).unwrap() else {
            panic!("expected help");
        };

        assert!(text.contains("-o, --out <path:string>"));
        assert!(text.contains("[extra:string...]"));
    }

    #[test]
    fn common_flags_before_target_run_first() {
        let mut engine = engine(Rc::default());

        engine.dispatch(["--debug", "build", "x"]).unwrap();

        assert!(engine.session().modes.debug);
    }

    #[test]
    fn unknown_target_is_usage_error() {
        let mut engine = engine(Rc::default());

        let err = engine.dispatch(["deploy"]).unwrap_err();

        assert!(matches!(err, RunError::Target(TargetError::UnknownTarget(_))));
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn target_flags_are_unknown_before_target() {
        let mut engine = engine(Rc::default());

        let err = engine.dispatch(["-v", "build", "x"]).unwrap_err();

        assert!(matches!(err, RunError::Args(ArgError::UnknownFlag { flag: 'v', .. })));
    }

    #[test]
    fn missing_dependency_unless_ignored() {
        let mut engine = engine(Rc::default());
        engine.require("definitely-not-installed-anywhere");

        let err = engine.dispatch(["build", "x"]).unwrap_err();
        assert!(matches!(err, RunError::Dependency(_)));
        assert_eq!(err.exit_code(), EXIT_DEPENDENCY);

        assert!(engine.dispatch(["--ignore-deps", "build", "x"]).is_ok());
    }

    #[test]
    fn ignore_deps_after_target_name() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut engine = engine(calls.clone());
        engine.require("definitely-not-installed-anywhere");

        engine.dispatch(["build", "--ignore-deps", "x"]).unwrap();

        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn missing_dependency_stops_before_handler() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut engine = engine(calls.clone());
        engine.require("definitely-not-installed-anywhere");

        assert!(engine.dispatch(["build", "x"]).is_err());
        assert_eq!(engine.phase(), Phase::ExecutingFlags);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn help_needs_no_dependencies() {
        let mut engine = engine(Rc::default());
        engine.require("definitely-not-installed-anywhere");

        for args in [vec![], vec!["-h"], vec!["build", "-h"], vec!["help", "build"]] {
            let outcome = engine.dispatch(args).unwrap();
            assert!(matches!(outcome, Outcome::Help(_)));
        }
    }

    #[test]
    fn help_with_several_targets_is_usage_error() {
        let mut engine = engine(Rc::default());

        let err = engine.dispatch(["help", "build", "deploy"]).unwrap_err();

        assert!(err.to_string().contains("unexpected argument 'deploy'"));
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn common_flag_collisions_rejected() {
        let mut engine = Engine::new("tool");

        let err = engine
            .common_flag(FlagSpec::new("hush", "Quiet", 0).short('h'), |_, _| Ok(()))
            .err()
            .unwrap();

        assert!(matches!(err, RegistryError::DuplicateFlag { short: 'h', .. }));
    }

    #[test]
    fn handler_errors_are_wrapped() {
        let mut engine = Engine::new("tool");
        engine.catalog_mut().builtin("fail", "Always fails", |reg| {
            reg.handler(|_, _| anyhow::bail!("nope"));
            Ok(())
        });

        let err = engine.dispatch(["fail"]).unwrap_err();

        assert!(err.to_string().contains("target 'fail' failed: nope"));
        assert_eq!(err.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn definition_errors_exit_three() {
        let mut engine = Engine::new("tool");
        engine.catalog_mut().builtin("bad", "Bad flag", |reg| {
            reg.add_flag(FlagSpec::new("help", "Clashes with the builtin", 0))?;
            reg.handler(|_, _| Ok(()));
            Ok(())
        });

        let err = engine.dispatch(["bad"]).unwrap_err();

        assert!(matches!(
            err,
            RunError::Target(TargetError::Registry(RegistryError::DuplicateFlagName(_)))
        ));
        assert_eq!(err.exit_code(), EXIT_DEFINITION);
    }
}
