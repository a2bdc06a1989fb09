//! Native callables: the small set of functions provided by the host rather
//! than defined in Lox itself.
//!
//! Each gets its own submodule, the way the reference interpreter's builtin
//! library organizes one file per function.

mod clock;
mod env_report;
mod help;
mod quit;

use std::time::Instant;

use crate::environment::Environment;
use crate::exception::RuntimeError;
use crate::heap::Heap;
use crate::intern::Interns;
use crate::io::PrintWriter;
use crate::value::Value;

/// A native function: identified by which one it is, dispatched through
/// [`NativeFn::call`]. Equality is identity of the underlying function, which
/// for a fixed enum of builtins is simply variant equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum NativeFn {
    Clock,
    Help,
    Env,
    Quit,
}

impl NativeFn {
    /// Natives that only make sense with a human at the keyboard; defined
    /// only when the REPL is running interactively.
    pub const INTERACTIVE_ONLY: [NativeFn; 3] = [NativeFn::Help, NativeFn::Env, NativeFn::Quit];

    #[must_use]
    pub fn arity(self) -> usize {
        0
    }

    #[allow(clippy::too_many_arguments)]
    pub fn call(
        self,
        args: Vec<Value>,
        start: Instant,
        print: &mut impl PrintWriter,
        quit_requested: &mut bool,
        globals: &Environment,
        heap: &Heap,
        interns: &Interns,
    ) -> Result<Value, RuntimeError> {
        debug_assert_eq!(args.len(), self.arity());
        match self {
            Self::Clock => Ok(clock::call(start)),
            Self::Help => {
                help::call(print);
                Ok(Value::Nil)
            }
            Self::Env => {
                env_report::call(print, globals, heap, interns);
                Ok(Value::Nil)
            }
            Self::Quit => {
                *quit_requested = true;
                Ok(Value::Nil)
            }
        }
    }
}
