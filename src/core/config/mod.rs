//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! flagwork has two configuration scopes:
//! - **Global**: User-level settings
//! - **Project**: Overrides for the working directory
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//! 4. Flags executed during dispatch (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$FLAGWORK_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/flagwork/config.toml`
//! 3. `~/.flagwork/config.toml`
//!
//! # Project Config Location
//!
//! `.flagwork/config.toml` under the working directory.
//!
//! # Example
//!
//! ```no_run
//! use flagwork::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/project"))).unwrap();
//! for dir in config.target_dirs() {
//!     println!("targets: {}", dir.display());
//! }
//! println!("preserve flags: {}", config.preserve_flags());
//! ```

pub mod schema;

pub use schema::ConfigFile;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory, relative to the project root, holding project-level files.
pub const PROJECT_DIR: &str = ".flagwork";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence rules: project values override global ones.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: ConfigFile,
    /// Project configuration (if present)
    pub project: Option<ConfigFile>,
    /// Project root, used for the default target directory
    project_root: Option<PathBuf>,
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `project_root` is provided, also loads the project config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(project_root: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(Self::find_global().as_deref(), project_root)
    }

    /// Load configuration from an explicit global file.
    pub fn load_from(
        global_path: Option<&Path>,
        project_root: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let global = match global_path {
            Some(path) if path.exists() => Self::read_config(path)?,
            _ => ConfigFile::default(),
        };

        let project_path = project_root
            .map(|root| root.join(PROJECT_DIR).join("config.toml"))
            .filter(|p| p.exists());
        let project = match &project_path {
            Some(path) => Some(Self::read_config(path)?),
            None => None,
        };

        Ok(Config {
            global,
            project,
            project_root: project_root.map(Path::to_path_buf),
            global_path: global_path.filter(|p| p.exists()).map(Path::to_path_buf),
            project_path,
        })
    }

    /// Locate the global config file.
    fn find_global() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("FLAGWORK_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("flagwork/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".flagwork/config.toml"))
            .filter(|p| p.exists())
    }

    /// Read, parse and validate a config file.
    ///
    /// Relative target directories are resolved against the file's own
    /// directory.
    fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut config: ConfigFile =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        config.validate()?;

        if let (Some(dirs), Some(base)) = (config.target_dirs.as_mut(), path.parent()) {
            for dir in dirs.iter_mut() {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }

        Ok(config)
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Directories searched for external targets, in search order.
    ///
    /// Project directories come before global ones. When neither file names
    /// any, defaults to `.flagwork/targets` under the project root.
    pub fn target_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .project
            .iter()
            .chain(std::iter::once(&self.global))
            .filter_map(|c| c.target_dirs.as_ref())
            .flatten()
            .cloned()
            .collect();

        if dirs.is_empty() {
            if let Some(root) = &self.project_root {
                dirs.push(root.join(PROJECT_DIR).join("targets"));
            }
        }
        dirs
    }

    /// Required executables from both scopes, deduplicated, in order.
    pub fn dependencies(&self) -> Vec<String> {
        let mut deps: Vec<String> = Vec::new();
        for dep in std::iter::once(&self.global)
            .chain(self.project.iter())
            .filter_map(|c| c.dependencies.as_ref())
            .flatten()
        {
            if !deps.contains(dep) {
                deps.push(dep.clone());
            }
        }
        deps
    }

    /// Defaults to `false` if not configured.
    pub fn preserve_flags(&self) -> bool {
        self.flag(|c| c.preserve_flags)
    }

    /// Defaults to `false` if not configured.
    pub fn ignore_deps(&self) -> bool {
        self.flag(|c| c.ignore_deps)
    }

    /// Defaults to `false` if not configured.
    pub fn debug(&self) -> bool {
        self.flag(|c| c.debug)
    }

    fn flag(&self, get: impl Fn(&ConfigFile) -> Option<bool>) -> bool {
        self.project
            .as_ref()
            .and_then(&get)
            .or_else(|| get(&self.global))
            .unwrap_or(false)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded project config file.
    pub fn project_config_loaded_from(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_project_config(root: &Path, contents: &str) -> PathBuf {
        let dir = root.join(PROJECT_DIR);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn load_empty_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(None, Some(temp.path())).unwrap();

        assert!(!config.preserve_flags());
        assert!(!config.ignore_deps());
        assert!(!config.debug());
        assert!(config.dependencies().is_empty());
        assert_eq!(
            config.target_dirs(),
            vec![temp.path().join(".flagwork/targets")]
        );
        assert!(config.project_config_loaded_from().is_none());
    }

    #[test]
    fn load_global_file() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("config.toml");
        fs::write(&global, "debug = true\ndependencies = [\"sh\"]\n").unwrap();

        let config = Config::load_from(Some(global.as_path()), None).unwrap();

        assert!(config.debug());
        assert_eq!(config.dependencies(), vec!["sh".to_string()]);
        assert_eq!(config.global_config_loaded_from(), Some(global.as_path()));
    }

    #[test]
    fn project_overrides_global() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("global.toml");
        fs::write(&global, "preserve_flags = true\ndependencies = [\"sh\"]\n").unwrap();
        write_project_config(
            temp.path(),
            "preserve_flags = false\ndependencies = [\"sh\", \"env\"]\n",
        );

        let config = Config::load_from(Some(global.as_path()), Some(temp.path())).unwrap();

        assert!(!config.preserve_flags());
        assert_eq!(
            config.dependencies(),
            vec!["sh".to_string(), "env".to_string()]
        );
    }

    #[test]
    fn relative_target_dirs_resolve_against_file() {
        let temp = TempDir::new().unwrap();
        let path = write_project_config(temp.path(), "target_dirs = [\"tasks\"]\n");

        let config = Config::load_from(None, Some(temp.path())).unwrap();

        assert_eq!(
            config.target_dirs(),
            vec![path.parent().unwrap().join("tasks")]
        );
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        write_project_config(temp.path(), "colour = true\n");

        let result = Config::load_from(None, Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn invalid_values_rejected() {
        let temp = TempDir::new().unwrap();
        write_project_config(temp.path(), "dependencies = [\"\"]\n");

        let result = Config::load_from(None, Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }
}
