//! Script execution contexts
//!
//! Each loaded script resource owns one execution context. The pool maps
//! resource names to stable context ids: a context joins when its
//! resource loads and leaves when it unloads, and listeners are bound to
//! contexts by id.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// Stable identifier of one script execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub u32);

/// Opaque reference to a callable value bound to one context.
///
/// The embedding engine owns the mapping from references to its real
/// function handles; the bridge only compares them for identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionRef(pub u64);

/// Live execution contexts keyed by resource name.
pub struct ContextPool {
    contexts: DashMap<String, ContextId>,
    next_id: AtomicU32,
}

impl ContextPool {
    pub fn new() -> Self {
        Self {
            contexts: DashMap::new(),
            next_id: AtomicU32::new(0),
        }
    }

    /// Add a context for a resource. Loading the same resource twice
    /// returns the existing id.
    pub fn add(&self, resource: &str) -> ContextId {
        *self
            .contexts
            .entry(resource.to_string())
            .or_insert_with(|| {
                let id = ContextId(self.next_id.fetch_add(1, Ordering::Relaxed));
                tracing::debug!(resource, id = id.0, "script context added");
                id
            })
    }

    /// Remove a resource's context, returning its id if it was loaded.
    pub fn remove(&self, resource: &str) -> Option<ContextId> {
        let removed = self.contexts.remove(resource).map(|(_, id)| id);
        if let Some(id) = removed {
            tracing::debug!(resource, id = id.0, "script context removed");
        }
        removed
    }

    pub fn get(&self, resource: &str) -> Option<ContextId> {
        self.contexts.get(resource).map(|entry| *entry)
    }

    /// Names of every loaded resource.
    pub fn resources(&self) -> Vec<String> {
        self.contexts.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl Default for ContextPool {
    fn default() -> Self {
        Self::new()
    }
}
