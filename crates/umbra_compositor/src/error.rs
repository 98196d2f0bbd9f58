//! Compositor definition error types

use std::fmt;

use thiserror::Error;

/// Classification of fatal definition errors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An input channel was registered on a node that cannot accept inputs
    UnsupportedInput,
    /// A definition or pass violates a structural invariant
    InvalidConfiguration,
    /// A definition collides with one that was already registered
    DuplicateDefinition,
    /// An insertion exceeded the reserved capacity of a registry
    CapacityExceeded,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnsupportedInput => "unsupported input",
            Self::InvalidConfiguration => "invalid configuration",
            Self::DuplicateDefinition => "duplicate definition",
            Self::CapacityExceeded => "capacity exceeded",
        };
        write!(f, "{name}")
    }
}

/// Fatal error raised while building or finalizing a node definition
///
/// Carries the error classification, a human-readable message naming the
/// offending node or definition, and the operation that raised it.
#[derive(Debug, Error)]
#[error("{kind}: {message} (in {operation})")]
pub struct CompositorError {
    kind: ErrorKind,
    message: String,
    operation: &'static str,
}

impl CompositorError {
    /// Create a new error
    pub fn new(kind: ErrorKind, message: impl Into<String>, operation: &'static str) -> Self {
        Self {
            kind,
            message: message.into(),
            operation,
        }
    }

    /// An input channel was registered on a node that cannot accept inputs
    pub fn unsupported_input(message: impl Into<String>, operation: &'static str) -> Self {
        Self::new(ErrorKind::UnsupportedInput, message, operation)
    }

    /// A definition or pass violates a structural invariant
    pub fn invalid_configuration(message: impl Into<String>, operation: &'static str) -> Self {
        Self::new(ErrorKind::InvalidConfiguration, message, operation)
    }

    /// A definition collides with one that was already registered
    pub fn duplicate_definition(message: impl Into<String>, operation: &'static str) -> Self {
        Self::new(ErrorKind::DuplicateDefinition, message, operation)
    }

    /// An insertion exceeded the reserved capacity of a registry
    pub fn capacity_exceeded(message: impl Into<String>, operation: &'static str) -> Self {
        Self::new(ErrorKind::CapacityExceeded, message, operation)
    }

    /// Get the error classification
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the human-readable message
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the operation that raised the error
    #[inline]
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

/// Result type for compositor definition operations
pub type CompositorResult<T> = Result<T, CompositorError>;
