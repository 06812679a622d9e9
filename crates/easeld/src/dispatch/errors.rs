//! Error types for request dispatch failures.

use std::io;

use easel_proto::{CodecError, FrameError};
use thiserror::Error;

/// Errors that end a connection.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Applying socket options failed.
    #[error("failed to configure connection: {0}")]
    Configure(#[source] io::Error),
    /// The request could not be framed or decoded.
    #[error("failed to read request: {0}")]
    Frame(#[from] FrameError),
    /// The response could not be written.
    #[error("failed to write response: {0}")]
    Write(#[from] CodecError),
    /// The request type is not dispatchable.
    #[error("unsupported request type '{kind}'")]
    UnsupportedType {
        /// Received request type.
        kind: String,
    },
}

impl DispatchError {
    /// Creates an unsupported request type error.
    pub fn unsupported_type(kind: impl Into<String>) -> Self {
        Self::UnsupportedType { kind: kind.into() }
    }
}
