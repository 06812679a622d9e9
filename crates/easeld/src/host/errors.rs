//! Errors raised by host invocations.

use thiserror::Error;

/// Failure reported by a host callable.
///
/// The resolver forwards these verbatim to the controller, including any
/// captured traceback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// More positional arguments were supplied than the callable declares.
    #[error("{operation}() takes {expected} positional arguments but {given} were given")]
    Arity {
        /// Callable name.
        operation: String,
        /// Declared positional parameter count.
        expected: usize,
        /// Supplied positional argument count.
        given: usize,
    },
    /// A keyword argument does not name a declared parameter.
    #[error("{operation}() got an unexpected keyword argument '{name}'")]
    UnexpectedKeyword {
        /// Callable name.
        operation: String,
        /// Offending keyword.
        name: String,
    },
    /// A parameter was bound both positionally and by keyword.
    #[error("{operation}() got multiple values for argument '{name}'")]
    DuplicateArgument {
        /// Callable name.
        operation: String,
        /// Parameter bound twice.
        name: String,
    },
    /// A required parameter was not bound.
    #[error("{operation}() missing required argument '{name}'")]
    MissingArgument {
        /// Callable name.
        operation: String,
        /// Missing parameter.
        name: String,
    },
    /// A bound argument has the wrong shape.
    #[error("{operation}() argument '{name}' must be {expected}, not {actual}")]
    ArgumentType {
        /// Callable name.
        operation: String,
        /// Parameter name.
        name: String,
        /// Expected shape.
        expected: String,
        /// Supplied shape.
        actual: String,
    },
    /// The target cannot be invoked.
    #[error("'{kind}' object is not callable")]
    NotInvocable {
        /// Runtime kind of the target.
        kind: String,
    },
    /// The host reported a failure of its own.
    #[error("{message}")]
    Host {
        /// Host-provided message.
        message: String,
        /// Host-provided trace, innermost frame last.
        traceback: Option<String>,
    },
}

impl InvocationError {
    /// Builds a host failure without a traceback.
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
            traceback: None,
        }
    }

    /// Builds an argument type failure.
    pub fn argument_type(
        operation: impl Into<String>,
        name: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ArgumentType {
            operation: operation.into(),
            name: name.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Returns the captured traceback, if any.
    #[must_use]
    pub fn traceback(&self) -> Option<&str> {
        match self {
            Self::Host { traceback, .. } => traceback.as_deref(),
            _ => None,
        }
    }

    /// Records `frame` as the outermost frame of a host failure.
    #[must_use]
    pub fn in_frame(self, frame: &str) -> Self {
        match self {
            Self::Host { message, traceback } => {
                let line = format!("  in {frame}");
                let traceback = match traceback {
                    Some(inner) => format!("{line}\n{inner}"),
                    None => line,
                };
                Self::Host {
                    message,
                    traceback: Some(traceback),
                }
            }
            other => other,
        }
    }
}
