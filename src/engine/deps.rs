//! engine::deps
//!
//! Eager check that required executables are installed.
//!
//! The check runs once per dispatch, after every flag has run and before
//! positional resolution, and is skipped entirely when `Modes::ignore_deps`
//! is set. Dispatches that end in help never reach it.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from the dependency check.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DependencyError {
    #[error("missing dependency '{0}': not found on PATH (pass --ignore-deps to skip this check)")]
    MissingDependency(String),
}

/// Check every dependency against the process `PATH`.
pub fn check(dependencies: &[String]) -> Result<(), DependencyError> {
    check_in(dependencies, std::env::var_os("PATH").as_deref())
}

/// Check every dependency against an explicit search path.
///
/// # Errors
///
/// Returns `MissingDependency` for the first executable not found.
pub fn check_in(dependencies: &[String], path: Option<&OsStr>) -> Result<(), DependencyError> {
    for dep in dependencies {
        if find_executable(dep, path).is_none() {
            return Err(DependencyError::MissingDependency(dep.clone()));
        }
    }
    Ok(())
}

/// Locate an executable in a `PATH`-style list of directories.
pub fn find_executable(name: &str, path: Option<&OsStr>) -> Option<PathBuf> {
    let path = path?;
    std::env::split_paths(path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn install(dir: &Path, name: &str) {
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[test]
    fn finds_installed_executable() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "tool");

        let found = find_executable("tool", Some(temp.path().as_os_str()));
        assert_eq!(found, Some(temp.path().join("tool")));
    }

    #[test]
    fn reports_first_missing_dependency() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "tool");
        let deps = vec!["tool".to_string(), "absent".to_string(), "gone".to_string()];

        let err = check_in(&deps, Some(temp.path().as_os_str())).unwrap_err();

        assert_eq!(err, DependencyError::MissingDependency("absent".into()));
        assert!(err.to_string().contains("--ignore-deps"));
    }

    #[test]
    fn no_path_means_nothing_found() {
        assert!(check_in(&["sh".to_string()], None).is_err());
        assert!(check_in(&[], None).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_file_is_ignored() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("data"), "").unwrap();

        assert!(find_executable("data", Some(temp.path().as_os_str())).is_none());
    }
}
