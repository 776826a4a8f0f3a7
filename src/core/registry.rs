//! core::registry
//!
//! The set of flags declared for the active target.
//!
//! # Invariants
//!
//! - Every long name maps to exactly one entry
//! - Every short form maps to exactly one long name
//! - Only validated specs are stored
//!
//! The registry is generic over the handler it stores next to each spec so
//! that the dispatcher can attach callables while tests can attach plain
//! markers.

use std::collections::HashMap;

use thiserror::Error;

use super::flag::FlagSpec;

/// Errors from flag registration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid flag '{flag}': {reason}")]
    InvalidFlagSpec { flag: String, reason: String },

    #[error("short flag '-{short}' of '--{flag}' is already used by '--{existing}'")]
    DuplicateFlag {
        short: char,
        flag: String,
        existing: String,
    },

    #[error("flag '--{0}' is already registered")]
    DuplicateFlagName(String),
}

/// A registered flag and its handler.
#[derive(Debug, Clone)]
pub struct FlagEntry<H> {
    pub spec: FlagSpec,
    pub handler: H,
}

/// Flags of the active target, keyed by long name and short form.
#[derive(Debug, Clone)]
pub struct FlagRegistry<H> {
    by_name: HashMap<String, FlagEntry<H>>,
    by_short: HashMap<char, String>,
}

impl<H> Default for FlagRegistry<H> {
    fn default() -> Self {
        Self {
            by_name: HashMap::new(),
            by_short: HashMap::new(),
        }
    }
}

impl<H> FlagRegistry<H> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flag.
    ///
    /// # Errors
    ///
    /// - `InvalidFlagSpec` if the spec fails validation
    /// - `DuplicateFlag` if the short form belongs to another flag
    /// - `DuplicateFlagName` if the long name is taken
    pub fn register(&mut self, spec: FlagSpec, handler: H) -> Result<(), RegistryError> {
        spec.validate()?;

        if let Some(short) = spec.short {
            if let Some(existing) = self.by_short.get(&short) {
                if *existing != spec.long {
                    return Err(RegistryError::DuplicateFlag {
                        short,
                        flag: spec.long,
                        existing: existing.clone(),
                    });
                }
            }
        }
        if self.by_name.contains_key(&spec.long) {
            return Err(RegistryError::DuplicateFlagName(spec.long));
        }

        if let Some(short) = spec.short {
            self.by_short.insert(short, spec.long.clone());
        }
        self.by_name
            .insert(spec.long.clone(), FlagEntry { spec, handler });
        Ok(())
    }

    /// Clear the registry.
    ///
    /// When `preserve` is set and `force` is not, the registry is kept as-is
    /// so that one target's flags survive into the next registration.
    /// Returns whether the registry was cleared.
    pub fn reset(&mut self, force: bool, preserve: bool) -> bool {
        if preserve && !force {
            return false;
        }
        self.by_name.clear();
        self.by_short.clear();
        true
    }

    /// Resolve a short form.
    pub fn lookup(&self, short: char) -> Option<&FlagEntry<H>> {
        self.by_short
            .get(&short)
            .and_then(|long| self.by_name.get(long))
    }

    /// Resolve a long name.
    pub fn lookup_by_name(&self, long: &str) -> Option<&FlagEntry<H>> {
        self.by_name.get(long)
    }

    pub fn contains(&self, long: &str) -> bool {
        self.by_name.contains_key(long)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// All specs, sorted by long name.
    pub fn specs(&self) -> Vec<&FlagSpec> {
        let mut specs: Vec<_> = self.by_name.values().map(|e| &e.spec).collect();
        specs.sort_by(|a, b| a.long.cmp(&b.long));
        specs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FlagRegistry<&'static str> {
        let mut reg = FlagRegistry::new();
        reg.register(FlagSpec::new("verbose", "Be loud", 0).short('v'), "verbose")
            .unwrap();
        reg
    }

    #[test]
    fn lookup_by_short_and_long_agree() {
        let reg = registry();
        let by_short = reg.lookup('v').unwrap();
        let by_name = reg.lookup_by_name("verbose").unwrap();
        assert_eq!(by_short.spec, by_name.spec);
        assert_eq!(by_short.handler, by_name.handler);
    }

    #[test]
    fn unknown_flags_are_absent() {
        let reg = registry();
        assert!(reg.lookup('x').is_none());
        assert!(reg.lookup_by_name("quiet").is_none());
    }

    #[test]
    fn duplicate_long_name_rejected() {
        let mut reg = registry();
        let err = reg
            .register(FlagSpec::new("verbose", "Again", 1), "again")
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateFlagName("verbose".into()));
    }

    #[test]
    fn duplicate_short_form_rejected() {
        let mut reg = registry();
        let err = reg
            .register(FlagSpec::new("version", "Print version", 0).short('v'), "x")
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateFlag { short: 'v', ref existing, .. } if existing == "verbose"
        ));
        // The failed registration leaves no trace
        assert!(!reg.contains("version"));
    }

    #[test]
    fn invalid_spec_rejected_before_insert() {
        let mut reg = registry();
        assert!(matches!(
            reg.register(FlagSpec::new("late", "desc", 12), "late"),
            Err(RegistryError::InvalidFlagSpec { .. })
        ));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn reset_respects_preserve_unless_forced() {
        let mut reg = registry();
        assert!(!reg.reset(false, true));
        assert_eq!(reg.len(), 1);

        assert!(reg.reset(true, true));
        assert!(reg.is_empty());
        assert!(reg.lookup('v').is_none());
    }

    #[test]
    fn specs_are_sorted() {
        let mut reg = registry();
        reg.register(FlagSpec::new("all", "Everything", 0), "all")
            .unwrap();
        let names: Vec<_> = reg.specs().iter().map(|s| s.long.as_str()).collect();
        assert_eq!(names, vec!["all", "verbose"]);
    }
}
