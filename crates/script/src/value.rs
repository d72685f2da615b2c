//! Script-side values
//!
//! The tagged variant that crosses the bridge in both directions. The
//! accessor methods mirror the loose numeric coercions scripting
//! runtimes apply: a missing or mistyped scalar coerces to zero rather
//! than failing the call, and anything converts to text.

/// A value decoded from script arguments or from host memory.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Int(i32),
    Float(f32),
    Text(String),
    IntArray(Vec<i32>),
    FloatArray(Vec<f32>),
}

impl ScriptValue {
    /// Coerce to a 32-bit integer. Non-numeric values coerce to 0.
    pub fn as_i32(&self) -> i32 {
        match self {
            ScriptValue::Int(v) => *v,
            ScriptValue::Float(v) => *v as i32,
            _ => 0,
        }
    }

    /// Coerce to a float. Non-numeric values coerce to 0.0.
    pub fn as_f32(&self) -> f32 {
        match self {
            ScriptValue::Int(v) => *v as f32,
            ScriptValue::Float(v) => *v,
            _ => 0.0,
        }
    }

    /// Coerce to text.
    pub fn as_text(&self) -> String {
        match self {
            ScriptValue::Text(s) => s.clone(),
            ScriptValue::Int(v) => v.to_string(),
            ScriptValue::Float(v) => v.to_string(),
            ScriptValue::IntArray(items) => items
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(","),
            ScriptValue::FloatArray(items) => items
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ScriptValue::IntArray(_) | ScriptValue::FloatArray(_))
    }
}
