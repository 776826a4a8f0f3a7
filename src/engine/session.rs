//! engine::session
//!
//! Mutable state shared by every phase of one dispatch.
//!
//! # Design
//!
//! The session replaces process-wide globals: mode toggles, values recorded
//! by flag handlers and a pending halt request all live here and are passed
//! explicitly to each handler. Handlers run one at a time, so no locking is
//! involved.

use crate::ui::output::Verbosity;

/// Process-wide mode toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modes {
    /// Keep the registry when the next target registers.
    pub preserve_flags: bool,
    /// Skip the dependency check.
    pub ignore_deps: bool,
    /// Emit debug logging.
    pub debug: bool,
}

/// A request to stop dispatch and render help instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    /// Summary of targets and common flags.
    Summary,
    /// Detailed help for one target.
    TargetHelp(String),
}

/// State threaded through flag handlers and the target handler.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub modes: Modes,
    recorded: Vec<(String, Option<String>)>,
    halt: Option<Halt>,
}

impl Session {
    pub fn new(modes: Modes) -> Self {
        Self {
            modes,
            ..Default::default()
        }
    }

    /// Record that a flag was given, with its argument if it takes one.
    ///
    /// Recording the same flag again replaces the earlier value.
    pub fn record(&mut self, long: &str, value: Option<&str>) {
        let value = value.map(str::to_string);
        match self.recorded.iter_mut().find(|(name, _)| name == long) {
            Some(entry) => entry.1 = value,
            None => self.recorded.push((long.to_string(), value)),
        }
    }

    /// Whether a flag has been recorded.
    pub fn is_set(&self, long: &str) -> bool {
        self.recorded.iter().any(|(name, _)| name == long)
    }

    /// The argument recorded for a flag.
    pub fn value(&self, long: &str) -> Option<&str> {
        self.recorded
            .iter()
            .find(|(name, _)| name == long)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Recorded flags in the order they were first recorded.
    pub fn recorded(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.recorded
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Ask the dispatcher to stop after the current handler.
    pub fn halt(&mut self, halt: Halt) {
        self.halt = Some(halt);
    }

    pub fn is_halted(&self) -> bool {
        self.halt.is_some()
    }

    pub fn take_halt(&mut self) -> Option<Halt> {
        self.halt.take()
    }

    /// Clear per-dispatch state, keeping the modes.
    pub fn clear(&mut self) {
        self.recorded.clear();
        self.halt = None;
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.modes.debug)
    }
}
