//! ui::help
//!
//! Help text rendering.
//!
//! Two views exist: the summary (every target and the common flags) and
//! the detail for one registered target. Both return plain strings; the
//! caller decides where they go.

use super::output::columns;
use crate::core::flag::FlagSpec;
use crate::target::{LoadedTarget, TargetSummary};

/// Render the top-level summary.
pub fn summary(program: &str, targets: &[TargetSummary], common: &[&FlagSpec]) -> String {
    let mut out = format!(
        "Usage: {} [common-flag [flag-argument]]... <target> \
         [target-flag [flag-argument]]... [positional-argument]...\n",
        program
    );

    out.push_str("\nTargets:\n");
    if targets.is_empty() {
        out.push_str("  (none)\n");
    } else {
        let rows: Vec<(String, String)> = targets
            .iter()
            .map(|t| (t.name.clone(), t.description.clone()))
            .collect();
        out.push_str(&columns(&rows));
        out.push('\n');
    }

    push_flags(&mut out, "Common flags", common);
    out.push_str(&format!(
        "\nRun '{} --help-target <target>' for details on one target.\n",
        program
    ));
    out
}

/// Render the detail view of one registered target.
///
/// `flags` are the target's own flags; `common` are shown separately.
pub fn target_detail(
    program: &str,
    target: &LoadedTarget,
    flags: &[&FlagSpec],
    common: &[&FlagSpec],
) -> String {
    let mut usage = format!("Usage: {} {}", program, target.name);
    if !flags.is_empty() || !common.is_empty() {
        usage.push_str(" [flags]");
    }
    if !target.positionals.is_empty() {
        usage.push(' ');
        usage.push_str(&target.positionals.usage());
    }

    let mut out = usage;
    out.push('\n');
    if !target.description.is_empty() {
        out.push('\n');
        out.push_str(&target.description);
        out.push('\n');
    }

    if !target.positionals.is_empty() {
        out.push_str("\nArguments:\n");
        let rows: Vec<(String, String)> = target
            .positionals
            .iter()
            .map(|p| (p.usage(), p.description.clone()))
            .collect();
        out.push_str(&columns(&rows));
        out.push('\n');
    }

    push_flags(&mut out, "Flags", flags);
    push_flags(&mut out, "Common flags", common);
    out
}

fn push_flags(out: &mut String, heading: &str, flags: &[&FlagSpec]) {
    if flags.is_empty() {
        return;
    }
    out.push_str(&format!("\n{}:\n", heading));
    let rows: Vec<(String, String)> = flags.iter().map(|f| flag_row(f)).collect();
    out.push_str(&columns(&rows));
    out.push('\n');
}

fn flag_row(spec: &FlagSpec) -> (String, String) {
    let mut description = spec.description.clone();
    if let Some(arg) = &spec.argument {
        description.push_str(&format!(" ({}: {})", arg.name, arg.description));
    }
    if spec.priority > 0 {
        description.push_str(&format!(" [priority {}]", spec.priority));
    }
    (spec.usage(), description)
}
