//! Error types for the tickloop simulator

use std::fmt;
use thiserror::Error;

/// Main error type for tickloop
///
/// Errors are plain data so a single rejection reason can be handed to every
/// continuation registered on a promise.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A thrown error - what `throw new TypeError(...)` produces in a callback
    #[error("{kind}: {message}")]
    Thrown { kind: ErrorKind, message: String },

    /// An error that escaped the synchronous entry action
    #[error("Uncaught {0}")]
    Uncaught(Box<Error>),

    /// A rejected promise that never had a rejection handler attached
    #[error("Unhandled promise rejection: {0}")]
    UnhandledRejection(Box<Error>),

    /// Resource limit exceeded (runaway microtask chains)
    #[error("ResourceLimitError: {kind}: {message}")]
    ResourceLimit {
        kind: ResourceLimitKind,
        message: String,
    },

    /// Invalid loop configuration
    #[error("ConfigError: {0}")]
    Config(String),

    /// No lesson scenario with this name
    #[error("unknown scenario `{0}`")]
    UnknownScenario(String),
}

/// Resource limit kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceLimitKind {
    /// Too many microtasks drained without reaching an empty queue
    MicrotaskBudget,
}

impl fmt::Display for ResourceLimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceLimitKind::MicrotaskBudget => write!(f, "MicrotaskBudget"),
        }
    }
}

/// Error kinds a callback can throw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
pub enum ErrorKind {
    /// Generic Error - user-thrown Error objects
    GenericError,
    /// TypeError - wrong type for operation
    TypeError,
    /// ReferenceError - undefined variable
    ReferenceError,
    /// RangeError - value out of range
    RangeError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::GenericError => write!(f, "Error"),
            ErrorKind::TypeError => write!(f, "TypeError"),
            ErrorKind::ReferenceError => write!(f, "ReferenceError"),
            ErrorKind::RangeError => write!(f, "RangeError"),
        }
    }
}

impl Error {
    /// Create a generic `Error`, the equivalent of `new Error(message)`
    pub fn new(message: impl Into<String>) -> Self {
        Self::thrown(ErrorKind::GenericError, message)
    }

    /// Create a thrown error of the given kind
    pub fn thrown(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error::Thrown {
            kind,
            message: message.into(),
        }
    }

    /// Create a TypeError
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::thrown(ErrorKind::TypeError, message)
    }

    /// Create a ReferenceError
    pub fn reference_error(message: impl Into<String>) -> Self {
        Self::thrown(ErrorKind::ReferenceError, message)
    }

    /// Create a RangeError
    pub fn range_error(message: impl Into<String>) -> Self {
        Self::thrown(ErrorKind::RangeError, message)
    }

    /// Create a microtask budget exceeded error
    pub fn microtask_budget_exceeded(limit: usize) -> Self {
        Error::ResourceLimit {
            kind: ResourceLimitKind::MicrotaskBudget,
            message: format!(
                "Microtask budget exceeded: more than {} microtasks in one drain pass",
                limit
            ),
        }
    }

    /// The `error.name` a catch block would see
    pub fn name(&self) -> String {
        match self {
            Error::Thrown { kind, .. } => kind.to_string(),
            Error::Uncaught(inner) | Error::UnhandledRejection(inner) => inner.name(),
            Error::ResourceLimit { .. } => "ResourceLimitError".to_string(),
            Error::Config(_) => "ConfigError".to_string(),
            Error::UnknownScenario(_) => "Error".to_string(),
        }
    }

    /// The `error.message` a catch block would see
    pub fn message(&self) -> String {
        match self {
            Error::Thrown { message, .. } => message.clone(),
            Error::Uncaught(inner) | Error::UnhandledRejection(inner) => inner.message(),
            Error::ResourceLimit { message, .. } => message.clone(),
            Error::Config(message) => message.clone(),
            Error::UnknownScenario(name) => format!("unknown scenario `{}`", name),
        }
    }

    /// Strip `Uncaught`/`UnhandledRejection` wrappers
    pub fn root(&self) -> &Error {
        match self {
            Error::Uncaught(inner) | Error::UnhandledRejection(inner) => inner.root(),
            other => other,
        }
    }
}

/// Result type alias for tickloop
pub type Result<T> = std::result::Result<T, Error>;
