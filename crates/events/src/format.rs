//! Format descriptors
//!
//! A format string assigns one type code per parameter position:
//!
//! - `i` — integer, truncated to 16 bits on the dispatch side
//! - `d` — signed 32-bit integer
//! - `f` — 32-bit float, cell-encoded host-side
//! - `s` — text
//! - `a` — array of integers
//! - `v` — array of floats
//!
//! Any other character is retained positionally but encodes and decodes
//! nothing. Existing event tables rely on that pass-through behavior, so
//! it is kept as-is.

use pawnbridge_core::{BridgeError, Result, MAX_PARAMS};

/// Type code for one parameter position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCode {
    /// `i` — integer carried as a cell, 16-bit unsigned on decode.
    Word,
    /// `d` — signed 32-bit integer.
    Int,
    /// `f` — float in the host cell encoding.
    Float,
    /// `s` — text.
    Text,
    /// `a` — array of integers.
    IntArray,
    /// `v` — array of floats.
    FloatArray,
    /// Unrecognized code; occupies its position, marshals nothing.
    Pass,
}

impl TypeCode {
    fn from_char(c: char) -> Self {
        match c {
            'i' => TypeCode::Word,
            'd' => TypeCode::Int,
            'f' => TypeCode::Float,
            's' => TypeCode::Text,
            'a' => TypeCode::IntArray,
            'v' => TypeCode::FloatArray,
            _ => TypeCode::Pass,
        }
    }

    /// Whether this code consumes a script-side argument when encoding.
    pub fn consumes_argument(&self) -> bool {
        !matches!(self, TypeCode::Pass)
    }
}

/// Parsed, positional parameter-type sequence for one event or call.
///
/// Parsed once at registration time and reused for every call and
/// dispatch referencing the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescriptor {
    codes: Vec<TypeCode>,
}

impl FormatDescriptor {
    /// Parse a format string. Fails if it declares more than
    /// [`MAX_PARAMS`] positions.
    pub fn parse(spec: &str) -> Result<Self> {
        let count = spec.chars().count();
        if count > MAX_PARAMS {
            return Err(BridgeError::MalformedFormat(count));
        }
        Ok(Self {
            codes: spec.chars().map(TypeCode::from_char).collect(),
        })
    }

    pub fn codes(&self) -> &[TypeCode] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
