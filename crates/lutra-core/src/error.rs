//! Core error types

use thiserror::Error;

/// Errors produced by the value core and its built-in surfaces
#[derive(Debug, Error)]
pub enum CoreError {
    /// Type error (e.g., serializing an unsupported value)
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Range error (e.g., index out of bounds)
    #[error("RangeError: {0}")]
    RangeError(String),

    /// Syntax error (e.g., malformed JSON text)
    #[error("SyntaxError: {0}")]
    SyntaxError(String),

    /// Internal error
    #[error("InternalError: {0}")]
    InternalError(String),
}

impl CoreError {
    /// Create a type error
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create a range error
    pub fn range_error(msg: impl Into<String>) -> Self {
        Self::RangeError(msg.into())
    }

    /// Create a syntax error
    pub fn syntax_error(msg: impl Into<String>) -> Self {
        Self::SyntaxError(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}

// Allows existing code using ? with String errors to compile
impl From<String> for CoreError {
    fn from(s: String) -> Self {
        CoreError::type_error(s)
    }
}

impl From<&str> for CoreError {
    fn from(s: &str) -> Self {
        CoreError::type_error(s)
    }
}

/// Result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;
