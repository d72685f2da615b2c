//! Script engine interface
//!
//! The bridge never executes script code itself; it asks the embedding
//! engine to. The engine is a shared single-owner resource: callers hold
//! the session's engine lock for the duration of any call through this
//! trait.

use crate::contexts::{ContextId, FunctionRef};
use crate::value::ScriptValue;

/// A failed listener invocation: the raised message plus a stack trace.
#[derive(Debug, Clone)]
pub struct InvokeFailure {
    pub message: String,
    pub stack: String,
}

/// The embedding scripting engine.
pub trait ScriptEngine: Send {
    /// Invoke a callable with positional arguments inside its owning
    /// execution context.
    fn invoke(
        &self,
        context: ContextId,
        function: FunctionRef,
        args: &[ScriptValue],
    ) -> Result<(), InvokeFailure>;

    /// Drain pending engine work. Called once per driver tick; the
    /// default does nothing.
    fn pump(&self) {}
}
