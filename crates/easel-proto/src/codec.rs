//! Encoding and incremental decoding of protocol messages.

use std::io::{self, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Terminator appended to every encoded message.
pub const MESSAGE_TERMINATOR: u8 = b'\n';

/// A successfully decoded message and the number of bytes it occupied.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    /// The decoded message.
    pub message: T,
    /// Bytes consumed from the start of the input, excluding any trailing
    /// whitespace or terminator.
    pub consumed: usize,
}

/// Outcome of a decode attempt that did not yield a message.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The input is a valid prefix of a message; more bytes may complete it.
    #[error("incomplete message")]
    Incomplete,
    /// The input can never become a valid message.
    #[error("malformed message: {0}")]
    Malformed(#[source] serde_json::Error),
}

impl DecodeError {
    /// Returns `true` when more bytes could complete the message.
    #[must_use]
    pub const fn is_incomplete(&self) -> bool {
        matches!(self, Self::Incomplete)
    }
}

/// Errors raised while encoding or writing a message.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Serialization failed.
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
    /// Writing to the peer failed.
    #[error("failed to write message: {0}")]
    Io(#[from] io::Error),
}

/// Encodes `message` as a newline-terminated JSON document.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] when the message cannot be serialized.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, CodecError> {
    let mut bytes = serde_json::to_vec(message)?;
    bytes.push(MESSAGE_TERMINATOR);
    Ok(bytes)
}

/// Decodes one message from the start of `bytes`.
///
/// Leading whitespace is skipped. Bytes after the first complete document
/// are left untouched and are not counted in [`Decoded::consumed`].
///
/// # Errors
///
/// Returns [`DecodeError::Incomplete`] when `bytes` is empty or ends inside a
/// document, and [`DecodeError::Malformed`] for any other failure.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<Decoded<T>, DecodeError> {
    let mut stream = serde_json::Deserializer::from_slice(bytes).into_iter::<T>();
    match stream.next() {
        Some(Ok(message)) => Ok(Decoded {
            message,
            consumed: stream.byte_offset(),
        }),
        Some(Err(error)) if error.is_eof() => Err(DecodeError::Incomplete),
        Some(Err(error)) => Err(DecodeError::Malformed(error)),
        None => Err(DecodeError::Incomplete),
    }
}

/// Encodes `message` and writes it to `writer`, flushing afterwards.
///
/// # Errors
///
/// Returns [`CodecError`] when encoding or writing fails.
pub fn write_message<T: Serialize, W: Write>(writer: &mut W, message: &T) -> Result<(), CodecError> {
    let bytes = encode(message)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
