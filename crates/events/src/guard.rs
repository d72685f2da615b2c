//! Reentrancy guard
//!
//! A gateway fan-out executes publics whose names may collide with
//! registered events; without the guard, the resulting public-call hook
//! would dispatch straight back into script code. The flag is owned by
//! the embedding session, held for the duration of one fan-out, and read
//! by the hook before it forwards to dispatch.
//!
//! A boolean, not a counter: the single-thread driver never nests
//! fan-outs. A nested `enter` is a logic error and asserts in debug
//! builds.

use std::sync::atomic::{AtomicBool, Ordering};

/// Call-scoped flag marking a gateway fan-out in flight.
pub struct ReentrancyGuard {
    active: AtomicBool,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
        }
    }

    /// Whether a fan-out is currently in flight.
    #[inline]
    pub fn active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Mark a fan-out in flight until the returned scope drops.
    pub fn enter(&self) -> GuardScope<'_> {
        let was_active = self.active.swap(true, Ordering::Relaxed);
        debug_assert!(!was_active, "gateway fan-outs must not nest");
        GuardScope { guard: self }
    }
}

impl Default for ReentrancyGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the flag on drop, on every exit path.
pub struct GuardScope<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for GuardScope<'_> {
    fn drop(&mut self) {
        self.guard.active.store(false, Ordering::Relaxed);
    }
}
