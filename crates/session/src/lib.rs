//! # Pawnbridge Session
//!
//! The embedding session ties the bridge together for one server
//! process: it owns the event registry, the reentrancy guard, the pools
//! of host VM instances and script contexts, the engine lock and the
//! diagnostic sink, and exposes the plugin lifecycle around them.
//!
//! The server's plugin shell calls `attach_instance`/`detach_instance`
//! as script-VM images load and unload, `public_call` from its
//! public-call hook, and `tick` once per server frame. Script bindings
//! call the registration API and the gateway entry points.

use parking_lot::{Mutex, RwLock};
use pawnbridge_config::{BridgeConfig, LogLevel};
use pawnbridge_core::{Cell, Result};
use pawnbridge_events::{gateway, register_builtins, EventRegistry, Listener, ReentrancyGuard};
use pawnbridge_host::{HostInstance, InstanceId, InstancePool, RawParams};
use pawnbridge_script::{ContextId, ContextPool, DiagnosticSink, LogSink, ScriptEngine, ScriptValue};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// One embedded bridge session.
pub struct Session {
    config: BridgeConfig,
    registry: RwLock<EventRegistry>,
    guard: ReentrancyGuard,
    instances: InstancePool,
    contexts: ContextPool,
    engine: Mutex<Box<dyn ScriptEngine>>,
    sink: Box<dyn DiagnosticSink>,
}

impl Session {
    /// Bring the bridge up: logging, the built-in event table, and the
    /// configured script resources. Diagnostics go through tracing.
    pub fn load(config: BridgeConfig, engine: Box<dyn ScriptEngine>) -> Self {
        Self::load_with_sink(config, engine, Box::new(LogSink))
    }

    /// `load` with a caller-supplied diagnostic sink.
    pub fn load_with_sink(
        config: BridgeConfig,
        engine: Box<dyn ScriptEngine>,
        sink: Box<dyn DiagnosticSink>,
    ) -> Self {
        init_logging(config.log_level);

        let mut registry = EventRegistry::new();
        register_builtins(&mut registry);

        let session = Self {
            registry: RwLock::new(registry),
            guard: ReentrancyGuard::new(),
            instances: InstancePool::new(),
            contexts: ContextPool::new(),
            engine: Mutex::new(engine),
            sink,
            config,
        };

        for resource in session.config.resources.clone() {
            session.load_resource(&resource);
        }

        tracing::info!(
            entry = %session.config.entry_file,
            resources = session.contexts.len(),
            "bridge session loaded"
        );
        session
    }

    /// Tear the session down: every resource unloads, every instance
    /// detaches. Registered events (and their formats) stay, matching a
    /// plugin unload where the process is going away anyway.
    pub fn unload(&self) {
        for resource in self.contexts.resources() {
            self.unload_resource(&resource);
        }
        for (id, _) in self.instances.snapshot() {
            self.instances.detach(id);
        }
        tracing::info!("bridge session unloaded");
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    // ----- host VM lifecycle ------------------------------------------

    /// A script-VM image finished loading; join it to the fan-out set.
    pub fn attach_instance(&self, instance: Arc<dyn HostInstance>) -> InstanceId {
        self.instances.attach(instance)
    }

    /// A script-VM image is unloading. Registered events are untouched.
    pub fn detach_instance(&self, id: InstanceId) {
        self.instances.detach(id);
    }

    // ----- script resource lifecycle ----------------------------------

    /// Add an execution context for a script resource.
    pub fn load_resource(&self, resource: &str) -> ContextId {
        self.contexts.add(resource)
    }

    /// Remove a resource's context and every listener it owns.
    pub fn unload_resource(&self, resource: &str) -> bool {
        match self.contexts.remove(resource) {
            Some(context) => {
                self.registry.write().remove_context_listeners(context);
                true
            }
            None => false,
        }
    }

    pub fn context(&self, resource: &str) -> Option<ContextId> {
        self.contexts.get(resource)
    }

    /// Drain pending engine work. Called once per server tick.
    pub fn tick(&self) {
        self.engine.lock().pump();
    }

    // ----- script-facing event API ------------------------------------

    /// Register an event. `Ok(false)` when the name is already taken.
    pub fn register_event(&self, name: &str, format_spec: &str) -> Result<bool> {
        self.registry.write().register(name, format_spec)
    }

    pub fn add_listener(&self, name: &str, listener: Listener) {
        self.registry.write().add_listener(name, listener);
    }

    pub fn remove_listeners(&self, name: &str, targets: Option<&[Listener]>) {
        self.registry.write().remove_listeners(name, targets);
    }

    /// Listeners currently registered for an event; 0 for unknown names.
    pub fn listener_count(&self, name: &str) -> usize {
        self.registry
            .read()
            .get(name)
            .map(|event| event.listeners().len())
            .unwrap_or(0)
    }

    // ----- script-facing call gateway ---------------------------------

    /// Call a public in every live instance, integer return.
    pub fn invoke_int(&self, name: &str, format_spec: &str, args: &[ScriptValue]) -> Result<i32> {
        gateway::invoke_int(&self.instances, &self.guard, name, format_spec, args)
    }

    /// Call a public in every live instance, float return.
    pub fn invoke_float(&self, name: &str, format_spec: &str, args: &[ScriptValue]) -> Result<f32> {
        gateway::invoke_float(&self.instances, &self.guard, name, format_spec, args)
    }

    // ----- host-facing hook -------------------------------------------

    /// The public-call hook: the host VM fired a public named `name` in
    /// `instance`. Suppressed while a gateway fan-out is in flight.
    pub fn public_call(
        &self,
        instance: &dyn HostInstance,
        name: &str,
        params: RawParams<'_>,
    ) -> Cell {
        pawnbridge_events::dispatch(
            &self.registry,
            &self.guard,
            &self.engine,
            &*self.sink,
            instance,
            name,
            params,
        )
    }
}

fn init_logging(level: LogLevel) {
    // Later sessions in the same process keep the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level.as_filter()))
        .try_init();
}
