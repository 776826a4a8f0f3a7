//! engine::schedule
//!
//! Priority scheduling and execution of parsed flags.
//!
//! # Ordering
//!
//! Invocations run by ascending priority, `0` first. Within one priority
//! they keep parse order. Handlers run synchronously, one after another,
//! and may change session state seen by later handlers and later phases.
//!
//! A handler that halts the session stops execution after it returns.

use thiserror::Error;

use super::parse::ScheduledInvocation;
use super::Session;
use crate::core::flag::MAX_PRIORITY;
use crate::ui::output;

/// A flag handler returned an error.
#[derive(Debug, Error)]
#[error("flag '--{flag}' failed: {cause:#}")]
pub struct FlagFailed {
    pub flag: String,
    pub cause: anyhow::Error,
}

/// Order pending invocations by priority bucket.
///
/// Buckets `0..=9` are emptied in ascending order, each in parse order.
/// Invocations with a priority outside that range are dropped; the registry
/// refuses to store such flags, so none reach this point in practice.
pub fn schedule(pending: Vec<ScheduledInvocation>) -> Vec<ScheduledInvocation> {
    let mut buckets: Vec<Vec<ScheduledInvocation>> =
        (0..=MAX_PRIORITY).map(|_| Vec::new()).collect();

    for invocation in pending {
        if let Some(bucket) = buckets.get_mut(usize::from(invocation.priority)) {
            bucket.push(invocation);
        }
    }

    buckets.into_iter().flatten().collect()
}

/// Run scheduled invocations in order.
///
/// Every flag whose handler succeeds is recorded in the session with its
/// argument. Returns the number of handlers that ran.
///
/// # Errors
///
/// Returns `FlagFailed` for the first handler that fails; later handlers
/// do not run.
pub fn execute(
    ordered: &[ScheduledInvocation],
    session: &mut Session,
) -> Result<usize, FlagFailed> {
    let mut ran = 0;
    for invocation in ordered {
        output::debug(
            format!(
                "run {} (priority {})",
                invocation.identifier, invocation.priority
            ),
            session.verbosity(),
        );

        invocation.invoke(session).map_err(|cause| FlagFailed {
            flag: invocation.flag.clone(),
            cause,
        })?;
        session.record(&invocation.flag, invocation.argument.as_deref());
        ran += 1;

        if session.is_halted() {
            output::debug("halt requested, skipping remaining flags", session.verbosity());
            break;
        }
    }
    Ok(ran)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::flag::FlagSpec;
    use crate::core::types::ArgType;
    use crate::engine::{flag_handler, Halt};

    /// An invocation whose handler records `tag` in the session.
    fn tagged(priority: u8, tag: &'static str) -> ScheduledInvocation {
        let spec = FlagSpec::new(tag, "test flag", priority);
        ScheduledInvocation::new(
            &spec,
            None,
            flag_handler(move |session, _| {
                let order = session.value("order").unwrap_or("").to_string();
                session.record("order", Some(format!("{order}{tag},").as_str()));
                Ok(())
            }),
        )
    }

    fn names(ordered: &[ScheduledInvocation]) -> Vec<&str> {
        ordered.iter().map(|i| i.flag.as_str()).collect()
    }

    #[test]
    fn schedule_is_stable_by_priority() {
        let pending = vec![
            tagged(3, "first3"),
            tagged(0, "zero"),
            tagged(3, "second3"),
            tagged(1, "one"),
        ];

        let ordered = schedule(pending);

        assert_eq!(names(&ordered), vec!["zero", "one", "first3", "second3"]);
    }

    #[test]
    fn schedule_drops_out_of_range_priorities() {
        let mut late = tagged(0, "late");
        late.priority = 10;

        let ordered = schedule(vec![late, tagged(9, "nine")]);

        assert_eq!(names(&ordered), vec!["nine"]);
    }

    #[test]
    fn execute_runs_in_order() {
        let mut session = Session::default();
        let ordered = schedule(vec![tagged(2, "b"), tagged(1, "a"), tagged(2, "c")]);

        let ran = execute(&ordered, &mut session).unwrap();

        assert_eq!(ran, 3);
        assert_eq!(session.value("order"), Some("a,b,c,"));
    }

    #[test]
    fn later_handlers_see_earlier_mutations() {
        let preserve = ScheduledInvocation::new(
            &FlagSpec::new("preserve", "test", 0),
            None,
            flag_handler(|session, _| {
                session.modes.preserve_flags = true;
                Ok(())
            }),
        );
        let observe = ScheduledInvocation::new(
            &FlagSpec::new("observe", "test", 5),
            None,
            flag_handler(|session, _| {
                let seen = session.modes.preserve_flags.to_string();
                session.record("seen", Some(seen.as_str()));
                Ok(())
            }),
        );
        let mut session = Session::default();

        execute(&schedule(vec![observe, preserve]), &mut session).unwrap();

        assert_eq!(session.value("seen"), Some("true"));
    }

    #[test]
    fn failure_stops_execution() {
        let failing = ScheduledInvocation::new(
            &FlagSpec::new("boom", "test", 0),
            None,
            flag_handler(|_, _| anyhow::bail!("exploded")),
        );
        let mut session = Session::default();

        let err = execute(&[failing, tagged(1, "after")], &mut session).unwrap_err();

        assert_eq!(err.flag, "boom");
        assert!(err.to_string().contains("exploded"));
        assert!(!session.is_set("order"));
    }

    #[test]
    fn halt_stops_execution() {
        let halting = ScheduledInvocation::new(
            &FlagSpec::new("help", "test", 0),
            None,
            flag_handler(|session, _| {
                session.halt(Halt::Summary);
                Ok(())
            }),
        );
        let mut session = Session::default();

        let ran = execute(&[halting, tagged(1, "after")], &mut session).unwrap();

        assert_eq!(ran, 1);
        assert!(!session.is_set("order"));
    }

    #[test]
    fn executed_flags_are_recorded() {
        let spec = FlagSpec::new("out", "test", 1).argument("path", ArgType::String, "dest");
        let silent = |spec: &FlagSpec, arg: Option<&str>| {
            ScheduledInvocation::new(spec, arg.map(str::to_string), flag_handler(|_, _| Ok(())))
        };
        let mut session = Session::default();

        execute(
            &[silent(&FlagSpec::new("debug", "test", 0), None), silent(&spec, Some("/tmp"))],
            &mut session,
        )
        .unwrap();

        let recorded: Vec<_> = session.recorded().collect();
        assert_eq!(recorded, vec![("debug", None), ("out", Some("/tmp"))]);
    }
}
