//! # Pawnbridge Script
//!
//! The scripting-engine side of the bridge: the tagged value that crosses
//! it, execution-context identity and lifecycle, the engine trait the
//! dispatch path invokes listeners through, and the diagnostic sink.

pub mod contexts;
pub mod diag;
pub mod engine;
pub mod value;

pub use contexts::{ContextId, ContextPool, FunctionRef};
pub use diag::{DiagnosticSink, LogSink};
pub use engine::{InvokeFailure, ScriptEngine};
pub use value::ScriptValue;
