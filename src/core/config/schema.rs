//! core::config::schema
//!
//! Configuration schema types.
//!
//! The same schema is used for the global file and the project file; the
//! project file overrides the global one field by field.
//!
//! # Validation
//!
//! Values are validated after parsing: dependency names must be bare
//! executable names and target directories must be non-empty paths.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// One configuration file.
///
/// # Example
///
/// ```toml
/// target_dirs = ["targets", "/opt/shared/targets"]
/// dependencies = ["git", "docker"]
/// preserve_flags = false
/// ignore_deps = false
/// debug = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Directories searched for external target definitions
    pub target_dirs: Option<Vec<PathBuf>>,

    /// Executables that must be on PATH before any target runs
    pub dependencies: Option<Vec<String>>,

    /// Keep one target's flags when registering the next
    pub preserve_flags: Option<bool>,

    /// Skip the dependency check
    pub ignore_deps: Option<bool>,

    /// Emit debug logging
    pub debug: Option<bool>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(deps) = &self.dependencies {
            for dep in deps {
                if dep.trim().is_empty() {
                    return Err(ConfigError::InvalidValue(
                        "dependency name cannot be empty".to_string(),
                    ));
                }
                if dep.contains(std::path::MAIN_SEPARATOR) || dep.contains('/') {
                    return Err(ConfigError::InvalidValue(format!(
                        "dependency '{}' must be an executable name, not a path",
                        dep
                    )));
                }
            }
        }

        if let Some(dirs) = &self.target_dirs {
            if dirs.iter().any(|d| d.as_os_str().is_empty()) {
                return Err(ConfigError::InvalidValue(
                    "target directory cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
