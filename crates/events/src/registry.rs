//! Event registry
//!
//! Maps event names to their format descriptor and ordered listener
//! list. The registry is an explicit object owned by the embedding
//! session and passed by reference into the gateway and dispatch paths.

use crate::format::FormatDescriptor;
use pawnbridge_core::Result;
use pawnbridge_script::{ContextId, FunctionRef};
use std::collections::HashMap;

/// A script-side callable registered against an event.
///
/// Identity is the function reference within its owning context; an
/// event's listener list never holds two equal listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub context: ContextId,
    pub function: FunctionRef,
}

impl Listener {
    pub fn new(context: ContextId, function: FunctionRef) -> Self {
        Self { context, function }
    }
}

/// A named, typed hook script listeners can subscribe to.
#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    pub params: FormatDescriptor,
    listeners: Vec<Listener>,
}

impl Event {
    fn new(name: String, params: FormatDescriptor) -> Self {
        Self {
            name,
            params,
            listeners: Vec::new(),
        }
    }

    /// Listeners in registration order.
    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    fn append(&mut self, listener: Listener) {
        if self.listeners.contains(&listener) {
            return;
        }
        self.listeners.push(listener);
    }

    fn remove(&mut self, listener: &Listener) {
        self.listeners.retain(|l| l != listener);
    }

    fn remove_all(&mut self) {
        self.listeners.clear();
    }
}

/// Name-keyed registry of events.
pub struct EventRegistry {
    events: HashMap<String, Event>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
        }
    }

    /// Register an event with its format string.
    ///
    /// Returns `Ok(false)` without touching the registry when the name
    /// is already taken. A format over capacity fails before anything is
    /// inserted.
    pub fn register(&mut self, name: &str, format_spec: &str) -> Result<bool> {
        if self.events.contains_key(name) {
            return Ok(false);
        }
        let params = FormatDescriptor::parse(format_spec)?;
        self.events
            .insert(name.to_string(), Event::new(name.to_string(), params));
        Ok(true)
    }

    /// Append a listener to an event. Unknown names and duplicate
    /// listeners are ignored; registration order is dispatch order.
    pub fn add_listener(&mut self, name: &str, listener: Listener) {
        if let Some(event) = self.events.get_mut(name) {
            event.append(listener);
        }
    }

    /// Remove listeners from an event. `targets` of `None` clears every
    /// listener; otherwise each listed listener is removed. Unknown
    /// names are ignored.
    pub fn remove_listeners(&mut self, name: &str, targets: Option<&[Listener]>) {
        let Some(event) = self.events.get_mut(name) else {
            return;
        };
        match targets {
            None => event.remove_all(),
            Some(targets) => {
                for target in targets {
                    event.remove(target);
                }
            }
        }
    }

    /// Drop every listener owned by a context, across all events. Called
    /// when the context's resource unloads.
    pub fn remove_context_listeners(&mut self, context: ContextId) {
        for event in self.events.values_mut() {
            event.listeners.retain(|l| l.context != context);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Event> {
        self.events.get(name)
    }

    /// Descriptor and listener list for a dispatch, cloned so the caller
    /// can drop the registry lock before invoking anything.
    pub fn snapshot(&self, name: &str) -> Option<(FormatDescriptor, Vec<Listener>)> {
        self.events
            .get(name)
            .map(|event| (event.params.clone(), event.listeners.clone()))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}
