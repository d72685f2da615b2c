//! Core error types for the bridge

/// Errors produced by the marshaling core
#[derive(thiserror::Error, Debug)]
pub enum BridgeError {
    /// Format string declares more positions than a call can carry
    #[error("format string declares {0} parameters, limit is {}", crate::MAX_PARAMS)]
    MalformedFormat(usize),

    /// An array-typed parameter was given a non-array value
    #[error("'{name}': parameter {index} must be an array")]
    MalformedArguments { name: String, index: usize },

    /// A host VM instance rejected a stack/heap/exec operation
    #[error("host instance fault: {0}")]
    Host(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
