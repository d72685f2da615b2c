//! # Pawnbridge Events
//!
//! The marshaling core of the bridge:
//!
//! - format descriptors parsed from compact type-code strings
//! - the event registry with listener identity and lifecycle
//! - the script→host call gateway with its fan-out across live instances
//! - the host→script dispatch path with per-listener failure isolation
//! - the reentrancy guard that keeps the two directions from looping
//!   into each other
//!
//! Everything here is synchronous and driven from the server's single
//! tick thread.

pub mod callbacks;
pub mod dispatch;
pub mod format;
pub mod gateway;
pub mod guard;
pub mod registry;

pub use callbacks::{register_builtins, BUILTIN_EVENTS};
pub use dispatch::dispatch;
pub use format::{FormatDescriptor, TypeCode};
pub use gateway::{invoke_float, invoke_int};
pub use guard::{GuardScope, ReentrancyGuard};
pub use registry::{Event, EventRegistry, Listener};
