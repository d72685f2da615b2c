//! Host→script dispatch
//!
//! Runs when the host VM fires a public whose name matches a registered
//! event: decode the host's parameter block per the event's descriptor,
//! invoke every listener in its own execution context, isolate listener
//! failures, and report the fixed acknowledgment back to the host no
//! matter what happened.

use crate::format::TypeCode;
use crate::guard::ReentrancyGuard;
use crate::registry::EventRegistry;
use parking_lot::{Mutex, RwLock};
use pawnbridge_core::{Cell, ACK};
use pawnbridge_host::{HostInstance, RawParams};
use pawnbridge_script::{DiagnosticSink, ScriptEngine, ScriptValue};

/// Dispatch a host-originated call to the listeners registered for
/// `name`. Always returns the acknowledgment cell; the host never sees
/// listener outcomes.
pub fn dispatch(
    registry: &RwLock<EventRegistry>,
    guard: &ReentrancyGuard,
    engine: &Mutex<Box<dyn ScriptEngine>>,
    sink: &dyn DiagnosticSink,
    instance: &dyn HostInstance,
    name: &str,
    params: RawParams<'_>,
) -> Cell {
    // A gateway fan-out is in flight: this call originated script-side
    // and must not dispatch back into script code.
    if guard.active() {
        tracing::trace!(event = name, "dispatch suppressed, gateway call in flight");
        return ACK;
    }

    // Snapshot under the read lock, invoke outside it: listeners may
    // mutate the registry while this dispatch is running.
    let Some((descriptor, listeners)) = registry.read().snapshot(name) else {
        return ACK;
    };

    let mut args = Vec::with_capacity(descriptor.len());
    for (position, code) in descriptor.codes().iter().enumerate() {
        if !code.consumes_argument() {
            continue;
        }
        let Some(cell) = params.get(position) else {
            break;
        };
        match code {
            TypeCode::Word => args.push(ScriptValue::Int((cell.0 as u16) as i32)),
            TypeCode::Int => args.push(ScriptValue::Int(cell.0)),
            TypeCode::Float => args.push(ScriptValue::Float(cell.as_f32())),
            TypeCode::Text => match instance.read_string(cell) {
                Ok(text) => args.push(ScriptValue::Text(text)),
                Err(e) => {
                    sink.report(&format!(
                        "can't read string parameter {position} of '{name}': {e}"
                    ));
                    return ACK;
                }
            },
            TypeCode::IntArray | TypeCode::FloatArray | TypeCode::Pass => {}
        }
    }

    let engine = engine.lock();
    for listener in &listeners {
        if let Err(failure) = engine.invoke(listener.context, listener.function, &args) {
            sink.report(&format!(
                "listener for '{}' raised: {}\nstack:\n{}",
                name, failure.message, failure.stack
            ));
        }
    }

    ACK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Listener;
    use pawnbridge_core::Cell;
    use pawnbridge_host::{params, MemoryInstance};
    use pawnbridge_script::{ContextId, FunctionRef, InvokeFailure};
    use std::sync::Arc;

    type InvocationLog = Arc<Mutex<Vec<(ContextId, FunctionRef, Vec<ScriptValue>)>>>;

    /// Engine double that records invocations and fails on request.
    struct RecordingEngine {
        invocations: InvocationLog,
        failing: Vec<FunctionRef>,
        on_invoke: Option<Box<dyn Fn() + Send>>,
    }

    impl RecordingEngine {
        fn new(invocations: InvocationLog) -> Self {
            Self {
                invocations,
                failing: Vec::new(),
                on_invoke: None,
            }
        }
    }

    impl ScriptEngine for RecordingEngine {
        fn invoke(
            &self,
            context: ContextId,
            function: FunctionRef,
            args: &[ScriptValue],
        ) -> Result<(), InvokeFailure> {
            self.invocations
                .lock()
                .push((context, function, args.to_vec()));
            if let Some(hook) = &self.on_invoke {
                hook();
            }
            if self.failing.contains(&function) {
                return Err(InvokeFailure {
                    message: "boom".into(),
                    stack: "at listener (script.js:1)".into(),
                });
            }
            Ok(())
        }
    }

    struct RecordingSink {
        reports: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                reports: Mutex::new(Vec::new()),
            }
        }
    }

    impl DiagnosticSink for RecordingSink {
        fn report(&self, text: &str) {
            self.reports.lock().push(text.to_string());
        }
    }

    fn listener(function: u64) -> Listener {
        Listener::new(ContextId(0), FunctionRef(function))
    }

    struct Fixture {
        registry: Arc<RwLock<EventRegistry>>,
        guard: ReentrancyGuard,
        engine: Mutex<Box<dyn ScriptEngine>>,
        sink: RecordingSink,
        instance: MemoryInstance,
        invocations: InvocationLog,
    }

    fn fixture(build: impl FnOnce(&mut RecordingEngine)) -> Fixture {
        let invocations: InvocationLog = Arc::new(Mutex::new(Vec::new()));
        let mut engine = RecordingEngine::new(invocations.clone());
        build(&mut engine);
        Fixture {
            registry: Arc::new(RwLock::new(EventRegistry::new())),
            guard: ReentrancyGuard::new(),
            engine: Mutex::new(Box::new(engine)),
            sink: RecordingSink::new(),
            instance: MemoryInstance::new(),
            invocations,
        }
    }

    fn run(fx: &Fixture, name: &str, cells: &[Cell]) -> Cell {
        let block = params::pack(cells);
        dispatch(
            &fx.registry,
            &fx.guard,
            &fx.engine,
            &fx.sink,
            &fx.instance,
            name,
            RawParams::new(&block),
        )
    }

    #[test]
    fn test_all_listeners_invoked_in_registration_order() {
        let fx = fixture(|_| {});
        {
            let mut registry = fx.registry.write();
            registry.register("OnPlayerConnect", "i").unwrap();
            registry.add_listener("OnPlayerConnect", listener(1));
            registry.add_listener("OnPlayerConnect", listener(2));
        }

        let ack = run(&fx, "OnPlayerConnect", &[Cell(7)]);

        assert_eq!(ack, ACK);
        let invocations = fx.invocations.lock();
        assert_eq!(invocations.len(), 2);
        assert_eq!(invocations[0].1, FunctionRef(1));
        assert_eq!(invocations[1].1, FunctionRef(2));
        assert_eq!(invocations[0].2, vec![ScriptValue::Int(7)]);
        assert_eq!(invocations[1].2, vec![ScriptValue::Int(7)]);
    }

    #[test]
    fn test_failing_listener_does_not_stop_the_rest() {
        let fx = fixture(|engine| engine.failing.push(FunctionRef(1)));
        {
            let mut registry = fx.registry.write();
            registry.register("OnPlayerConnect", "i").unwrap();
            registry.add_listener("OnPlayerConnect", listener(1));
            registry.add_listener("OnPlayerConnect", listener(2));
        }

        let ack = run(&fx, "OnPlayerConnect", &[Cell(7)]);

        assert_eq!(ack, ACK);
        assert_eq!(fx.invocations.lock().len(), 2);

        let reports = fx.sink.reports.lock();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].contains("boom"));
        assert!(reports[0].contains("script.js:1"));
    }

    #[test]
    fn test_suppressed_while_gateway_in_flight() {
        let fx = fixture(|_| {});
        {
            let mut registry = fx.registry.write();
            registry.register("OnPlayerConnect", "i").unwrap();
            registry.add_listener("OnPlayerConnect", listener(1));
        }

        let _in_flight = fx.guard.enter();
        let ack = run(&fx, "OnPlayerConnect", &[Cell(7)]);

        assert_eq!(ack, ACK);
        assert!(fx.invocations.lock().is_empty());
    }

    #[test]
    fn test_unknown_event_acks_without_invoking() {
        let fx = fixture(|_| {});
        let ack = run(&fx, "OnMissing", &[Cell(7)]);
        assert_eq!(ack, ACK);
        assert!(fx.invocations.lock().is_empty());
    }

    #[test]
    fn test_word_code_truncates_to_unsigned_16_bits() {
        let fx = fixture(|_| {});
        {
            let mut registry = fx.registry.write();
            registry.register("OnNarrow", "i").unwrap();
            registry.register("OnWide", "d").unwrap();
            registry.add_listener("OnNarrow", listener(1));
            registry.add_listener("OnWide", listener(2));
        }

        run(&fx, "OnNarrow", &[Cell(0x0001_FFFF)]);
        run(&fx, "OnWide", &[Cell(0x0001_FFFF)]);

        let invocations = fx.invocations.lock();
        assert_eq!(invocations[0].2, vec![ScriptValue::Int(0xFFFF)]);
        assert_eq!(invocations[1].2, vec![ScriptValue::Int(0x0001_FFFF)]);
    }

    #[test]
    fn test_float_cells_decode_to_floats() {
        let fx = fixture(|_| {});
        {
            let mut registry = fx.registry.write();
            registry.register("OnAim", "f").unwrap();
            registry.add_listener("OnAim", listener(1));
        }

        run(&fx, "OnAim", &[Cell::from_f32(3.5)]);

        assert_eq!(fx.invocations.lock()[0].2, vec![ScriptValue::Float(3.5)]);
    }

    #[test]
    fn test_string_cells_decode_from_instance_memory() {
        let fx = fixture(|_| {});
        {
            let mut registry = fx.registry.write();
            registry.register("OnPlayerText", "is").unwrap();
            registry.add_listener("OnPlayerText", listener(1));
        }

        let addr = fx.instance.push_string("hi there").unwrap();
        run(&fx, "OnPlayerText", &[Cell(3), Cell(addr.0)]);

        assert_eq!(
            fx.invocations.lock()[0].2,
            vec![
                ScriptValue::Int(3),
                ScriptValue::Text("hi there".to_string())
            ]
        );
    }

    #[test]
    fn test_bad_string_address_acks_and_reports() {
        let fx = fixture(|_| {});
        {
            let mut registry = fx.registry.write();
            registry.register("OnPlayerText", "s").unwrap();
            registry.add_listener("OnPlayerText", listener(1));
        }

        let ack = run(&fx, "OnPlayerText", &[Cell(0xBAD)]);

        assert_eq!(ack, ACK);
        assert!(fx.invocations.lock().is_empty());
        assert_eq!(fx.sink.reports.lock().len(), 1);
    }

    #[test]
    fn test_decode_stops_at_declared_count() {
        let fx = fixture(|_| {});
        {
            let mut registry = fx.registry.write();
            registry.register("OnPlayerDeath", "iii").unwrap();
            registry.add_listener("OnPlayerDeath", listener(1));
        }

        // Block declares a single parameter despite the three-code format.
        run(&fx, "OnPlayerDeath", &[Cell(9)]);

        assert_eq!(fx.invocations.lock()[0].2, vec![ScriptValue::Int(9)]);
    }

    #[test]
    fn test_listener_added_during_dispatch_not_invoked_this_round() {
        let invocations: InvocationLog = Arc::new(Mutex::new(Vec::new()));
        let registry = Arc::new(RwLock::new(EventRegistry::new()));
        {
            let mut reg = registry.write();
            reg.register("OnPlayerConnect", "i").unwrap();
            reg.add_listener("OnPlayerConnect", listener(1));
        }

        let mut engine = RecordingEngine::new(invocations.clone());
        let registry_in_hook = registry.clone();
        engine.on_invoke = Some(Box::new(move || {
            registry_in_hook
                .write()
                .add_listener("OnPlayerConnect", listener(99));
        }));

        let fx = Fixture {
            registry,
            guard: ReentrancyGuard::new(),
            engine: Mutex::new(Box::new(engine)),
            sink: RecordingSink::new(),
            instance: MemoryInstance::new(),
            invocations,
        };

        run(&fx, "OnPlayerConnect", &[Cell(7)]);
        assert_eq!(fx.invocations.lock().len(), 1);

        // The next dispatch sees the listener the first one added.
        run(&fx, "OnPlayerConnect", &[Cell(7)]);
        assert_eq!(fx.invocations.lock().len(), 3);
    }
}
