//! core::naming
//!
//! Deterministic identifiers derived from flag and target names.
//!
//! # Conventions
//!
//! - Flag handlers live under `flag_name_<normalized-long-name>`
//! - Target handlers live under `target_<normalized-target-name>`
//!
//! Normalization collapses every run of non-alphanumeric characters into a
//! single underscore and trims underscores from both ends.

use std::sync::LazyLock;

use regex::Regex;

static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

/// Prefix of flag handler identifiers.
pub const FLAG_PREFIX: &str = "flag_name_";

/// Prefix of the environment variables flags are exported under.
pub const FLAG_ENV_PREFIX: &str = "FLAG_NAME_";

/// Prefix of target handler identifiers.
pub const TARGET_PREFIX: &str = "target_";

/// Normalize a name into an identifier fragment.
///
/// # Example
///
/// ```
/// use flagwork::core::naming::normalize;
///
/// assert_eq!(normalize("help-target"), "help_target");
/// assert_eq!(normalize("deploy--app.v2"), "deploy_app_v2");
/// ```
pub fn normalize(name: &str) -> String {
    SEPARATOR_RE
        .replace_all(name, "_")
        .trim_matches('_')
        .to_string()
}

/// Identifier of the handler for a flag's long name.
pub fn flag_identifier(long_name: &str) -> String {
    format!("{}{}", FLAG_PREFIX, normalize(long_name))
}

/// Identifier the dispatcher expects a target's handler to be bound under.
pub fn target_identifier(target: &str) -> String {
    format!("{}{}", TARGET_PREFIX, normalize(target))
}

/// Environment variable name under which an external target sees a flag.
pub fn flag_env_var(long_name: &str) -> String {
    flag_identifier(long_name).to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(normalize("a-b_c d"), "a_b_c_d");
        assert_eq!(normalize("a---b"), "a_b");
        assert_eq!(normalize("-lead-"), "lead");
    }

    #[test]
    fn normalize_keeps_alphanumerics() {
        assert_eq!(normalize("Build2"), "Build2");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn identifiers_use_prefixes() {
        assert_eq!(flag_identifier("preserve-flags"), "flag_name_preserve_flags");
        assert_eq!(target_identifier("db:migrate"), "target_db_migrate");
        assert_eq!(flag_env_var("out"), "FLAG_NAME_OUT");
        assert!(flag_env_var("dry-run").starts_with(FLAG_ENV_PREFIX));
    }
}
