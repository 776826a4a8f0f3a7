//! engine
//!
//! Orchestrates one dispatch: select a target, register it, parse and run
//! its flags, resolve its positional arguments and invoke its handler.
//!
//! # Architecture
//!
//! ```text
//! argv -> common flags -> SelectingTarget -> Registering -> ParsingFlags
//!      -> ExecutingFlags -> dependency check -> ResolvingPositionals -> Invoking
//! ```
//!
//! Each phase is a separate module:
//!
//! - [`parse`] - drains flag tokens into a pending schedule
//! - [`schedule`] - orders the schedule by priority and runs it
//! - [`resolve`] - consumes positional arguments
//! - [`deps`] - checks required executables
//! - [`runner`] - the dispatcher driving all of the above
//!
//! # Invariants
//!
//! - Every phase runs to completion before the next begins
//! - The first error aborts the whole dispatch
//! - All mutable state lives in an explicit [`Session`]; nested dispatch
//!   resets the registry unless preserve mode was requested
//!
//! # Example
//!
//! ```
//! use flagwork::core::flag::FlagSpec;
//! use flagwork::engine::{Engine, Outcome};
//!
//! let mut engine = Engine::new("tool");
//! engine.catalog_mut().builtin("greet", "Say hello", |reg| {
//!     reg.add_flag(FlagSpec::new("loud", "Shout", 0).short('l'))?
//!         .add_argument("name", "string", "Who to greet")?;
//!     reg.handler(|session, args| {
//!         assert!(session.is_set("loud"));
//!         assert_eq!(args, ["world"]);
//!         Ok(())
//!     });
//!     Ok(())
//! });
//!
//! let outcome = engine.dispatch(["greet", "-l", "world"]).unwrap();
//! assert_eq!(outcome, Outcome::Completed { target: "greet".into() });
//! ```

pub mod deps;
pub mod parse;
pub mod resolve;
pub mod runner;
pub mod schedule;
pub mod session;
pub mod stream;

use std::rc::Rc;

pub use deps::DependencyError;
pub use parse::{parse_flags, ArgError, ScheduledInvocation};
pub use resolve::resolve_positionals;
pub use runner::{Engine, Outcome, Phase, RunError};
pub use schedule::{execute, schedule, FlagFailed};
pub use session::{Halt, Modes, Session};
pub use stream::ArgStream;

use crate::core::registry::FlagRegistry;

/// Callable run when a flag is executed, given its argument if any.
pub type FlagHandler = Rc<dyn Fn(&mut Session, Option<&str>) -> anyhow::Result<()>>;

/// Callable run with a target's resolved positional arguments.
pub type TargetHandler = Rc<dyn Fn(&mut Session, &[String]) -> anyhow::Result<()>>;

/// The registry of the active target.
pub type Registry = FlagRegistry<FlagHandler>;

/// Wrap a closure as a [`FlagHandler`].
pub fn flag_handler<F>(f: F) -> FlagHandler
where
    F: Fn(&mut Session, Option<&str>) -> anyhow::Result<()> + 'static,
{
    Rc::new(f)
}

/// Wrap a closure as a [`TargetHandler`].
pub fn target_handler<F>(f: F) -> TargetHandler
where
    F: Fn(&mut Session, &[String]) -> anyhow::Result<()> + 'static,
{
    Rc::new(f)
}
