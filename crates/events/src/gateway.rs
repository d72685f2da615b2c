//! Script→host call gateway
//!
//! Encodes script-side arguments once per call, then fans the call out
//! across every live host VM instance: resolve the public, push the
//! parameters in reverse positional order, execute, release that
//! instance's heap allocations in reverse acquisition order, move on.
//! The guard is held across the whole fan-out so a public that fires a
//! name colliding with a registered event does not dispatch back into
//! script code.
//!
//! The return value is the most recently completed instance's return
//! cell; with no resolving instance it is zero.

use crate::format::{FormatDescriptor, TypeCode};
use crate::guard::ReentrancyGuard;
use pawnbridge_core::{BridgeError, Cell, Result};
use pawnbridge_host::{HeapAddr, HostInstance, InstancePool, PublicIndex};
use pawnbridge_script::ScriptValue;

/// One encoded parameter slot. Slots stay aligned with descriptor
/// positions, so pass-through codes occupy a slot that pushes nothing.
enum EncodedParam {
    Scalar(Cell),
    Text(String),
    Array(Vec<Cell>),
    Skip,
}

/// Releases tracked heap allocations in reverse acquisition order when
/// dropped, so a failed push or exec cannot leak into the instance.
struct HeapFrame<'a> {
    instance: &'a dyn HostInstance,
    addrs: Vec<HeapAddr>,
}

impl<'a> HeapFrame<'a> {
    fn new(instance: &'a dyn HostInstance) -> Self {
        Self {
            instance,
            addrs: Vec::new(),
        }
    }

    fn track(&mut self, addr: HeapAddr) {
        self.addrs.push(addr);
    }
}

impl Drop for HeapFrame<'_> {
    fn drop(&mut self) {
        for addr in self.addrs.drain(..).rev() {
            self.instance.release(addr);
        }
    }
}

/// Call a public in every live instance and return the integer result.
pub fn invoke_int(
    pool: &InstancePool,
    guard: &ReentrancyGuard,
    name: &str,
    format_spec: &str,
    args: &[ScriptValue],
) -> Result<i32> {
    fan_out(pool, guard, name, format_spec, args).map(|ret| ret.0)
}

/// Call a public in every live instance and return the float result.
pub fn invoke_float(
    pool: &InstancePool,
    guard: &ReentrancyGuard,
    name: &str,
    format_spec: &str,
    args: &[ScriptValue],
) -> Result<f32> {
    fan_out(pool, guard, name, format_spec, args).map(|ret| ret.as_f32())
}

fn fan_out(
    pool: &InstancePool,
    guard: &ReentrancyGuard,
    name: &str,
    format_spec: &str,
    args: &[ScriptValue],
) -> Result<Cell> {
    let descriptor = FormatDescriptor::parse(format_spec)?;
    let encoded = encode(name, &descriptor, args)?;

    let _in_flight = guard.enter();
    let mut ret = Cell(0);
    for (id, instance) in pool.snapshot() {
        let Some(index) = instance.find_public(name) else {
            continue;
        };
        if index.is_reserved() {
            continue;
        }
        match call_instance(&*instance, index, &encoded) {
            Ok(value) => ret = value,
            Err(e) => {
                tracing::warn!(instance = id.0, public = name, error = %e, "instance call failed, skipping");
            }
        }
    }
    // `encoded` drops here: the call-level decode buffers live exactly as
    // long as the fan-out.
    Ok(ret)
}

/// Decode script arguments into one owned slot per descriptor position.
/// Array mismatches fail here, before any host interaction.
fn encode(
    name: &str,
    descriptor: &FormatDescriptor,
    args: &[ScriptValue],
) -> Result<Vec<EncodedParam>> {
    let mut encoded = Vec::with_capacity(descriptor.len());
    let mut cursor = 0usize;
    for code in descriptor.codes() {
        let arg = args.get(cursor);
        match code {
            TypeCode::Word | TypeCode::Int => {
                encoded.push(EncodedParam::Scalar(Cell(
                    arg.map(ScriptValue::as_i32).unwrap_or(0),
                )));
            }
            TypeCode::Float => {
                encoded.push(EncodedParam::Scalar(Cell::from_f32(
                    arg.map(ScriptValue::as_f32).unwrap_or(0.0),
                )));
            }
            TypeCode::Text => {
                encoded.push(EncodedParam::Text(
                    arg.map(ScriptValue::as_text).unwrap_or_default(),
                ));
            }
            TypeCode::IntArray => {
                let cells = match arg {
                    Some(ScriptValue::IntArray(items)) => {
                        items.iter().map(|v| Cell(*v)).collect()
                    }
                    Some(ScriptValue::FloatArray(items)) => {
                        items.iter().map(|v| Cell(*v as i32)).collect()
                    }
                    _ => {
                        return Err(BridgeError::MalformedArguments {
                            name: name.to_string(),
                            index: cursor,
                        })
                    }
                };
                encoded.push(EncodedParam::Array(cells));
            }
            TypeCode::FloatArray => {
                let cells = match arg {
                    Some(ScriptValue::FloatArray(items)) => {
                        items.iter().map(|v| Cell::from_f32(*v)).collect()
                    }
                    Some(ScriptValue::IntArray(items)) => {
                        items.iter().map(|v| Cell::from_f32(*v as f32)).collect()
                    }
                    _ => {
                        return Err(BridgeError::MalformedArguments {
                            name: name.to_string(),
                            index: cursor,
                        })
                    }
                };
                encoded.push(EncodedParam::Array(cells));
            }
            TypeCode::Pass => {
                encoded.push(EncodedParam::Skip);
                continue;
            }
        }
        cursor += 1;
    }
    Ok(encoded)
}

/// Push the encoded parameters into one instance, last formal first, run
/// the public and hand back its return cell. The frame releases every
/// heap allocation on the way out, success or not.
fn call_instance(
    instance: &dyn HostInstance,
    index: PublicIndex,
    encoded: &[EncodedParam],
) -> Result<Cell> {
    let mut frame = HeapFrame::new(instance);
    for param in encoded.iter().rev() {
        match param {
            EncodedParam::Skip => {}
            EncodedParam::Scalar(cell) => instance.push(*cell)?,
            EncodedParam::Text(text) => {
                let addr = instance.push_string(text)?;
                frame.track(addr);
            }
            EncodedParam::Array(cells) => {
                let addr = instance.push_array(cells)?;
                frame.track(addr);
            }
        }
    }
    instance.exec(index)
}
