//! Receiver-side message framing.
//!
//! A receiver reads exactly one message per connection. Three framings are
//! supported and every sender-produced message satisfies all of them:
//!
//! - [`Framing::WholeBuffer`] accumulates reads until the bytes decode or the
//!   peer closes the stream.
//! - [`Framing::SingleShot`] decodes the result of one bounded read.
//! - [`Framing::Delimited`] reads up to the first newline.

use std::io::{self, Read};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::codec::{DecodeError, MESSAGE_TERMINATOR, decode};

const CHUNK_BYTES: usize = 4096;
const SINGLE_SHOT_BYTES: usize = 64 * 1024;

/// Strategy used to find the end of a message on the receiving side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Framing {
    /// Accumulate until decode succeeds or the peer closes the stream.
    #[default]
    WholeBuffer,
    /// Decode the result of a single bounded read.
    SingleShot,
    /// Read up to the first newline.
    Delimited,
}

/// Errors raised while reading a framed message.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Reading from the peer failed.
    #[error("failed to read message: {0}")]
    Io(#[source] io::Error),
    /// The read deadline elapsed before a full message arrived.
    #[error("timed out after receiving {received} bytes")]
    TimedOut {
        /// Bytes received before the deadline.
        received: usize,
    },
    /// The peer closed the stream partway through a message.
    #[error("stream closed after {received} bytes of an incomplete message")]
    Truncated {
        /// Bytes received before the stream closed.
        received: usize,
    },
    /// The received bytes can never form a valid message.
    #[error("malformed message: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The message exceeded the configured size bound.
    #[error("message of at least {size} bytes exceeds the {max} byte limit")]
    TooLarge {
        /// Bytes received when the bound was crossed.
        size: usize,
        /// Configured bound.
        max: usize,
    },
}

impl FrameError {
    fn from_io(error: io::Error, received: usize) -> Self {
        match error.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::TimedOut { received },
            _ => Self::Io(error),
        }
    }

    fn from_decode(error: DecodeError, received: usize) -> Self {
        match error {
            DecodeError::Incomplete => Self::Truncated { received },
            DecodeError::Malformed(source) => Self::Malformed(source),
        }
    }
}

/// Reads one message from a stream using a configured [`Framing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReader {
    framing: Framing,
    max_bytes: usize,
}

impl FrameReader {
    /// Builds a reader that refuses messages larger than `max_bytes`.
    #[must_use]
    pub const fn new(framing: Framing, max_bytes: usize) -> Self {
        Self { framing, max_bytes }
    }

    /// Reads and decodes one message.
    ///
    /// Returns `Ok(None)` when the peer closes the stream before sending any
    /// bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError`] when reading fails, the deadline elapses, the
    /// message is malformed or truncated, or it exceeds the size bound.
    pub fn read_message<T, R>(&self, reader: &mut R) -> Result<Option<T>, FrameError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        match self.framing {
            Framing::WholeBuffer => self.read_whole_buffer(reader),
            Framing::SingleShot => self.read_single_shot(reader),
            Framing::Delimited => self.read_delimited(reader),
        }
    }

    fn read_whole_buffer<T, R>(&self, reader: &mut R) -> Result<Option<T>, FrameError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let mut buffer = Vec::new();
        let mut chunk = [0_u8; CHUNK_BYTES];
        loop {
            let read = read_with_retry(reader, &mut chunk)
                .map_err(|error| FrameError::from_io(error, buffer.len()))?;
            if read == 0 {
                return finish_at_end_of_stream(&buffer);
            }
            buffer.extend_from_slice(chunk.get(..read).unwrap_or_default());
            self.enforce_limit(buffer.len())?;
            match decode::<T>(&buffer) {
                Ok(decoded) => return Ok(Some(decoded.message)),
                Err(DecodeError::Incomplete) => {}
                Err(DecodeError::Malformed(source)) => return Err(FrameError::Malformed(source)),
            }
        }
    }

    fn read_single_shot<T, R>(&self, reader: &mut R) -> Result<Option<T>, FrameError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let mut buffer = vec![0_u8; self.max_bytes.min(SINGLE_SHOT_BYTES)];
        let read =
            read_with_retry(reader, &mut buffer).map_err(|error| FrameError::from_io(error, 0))?;
        if read == 0 {
            return Ok(None);
        }
        let bytes = buffer.get(..read).unwrap_or_default();
        decode::<T>(bytes)
            .map(|decoded| Some(decoded.message))
            .map_err(|error| FrameError::from_decode(error, read))
    }

    fn read_delimited<T, R>(&self, reader: &mut R) -> Result<Option<T>, FrameError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let mut buffer = Vec::new();
        let mut chunk = [0_u8; CHUNK_BYTES];
        loop {
            let read = read_with_retry(reader, &mut chunk)
                .map_err(|error| FrameError::from_io(error, buffer.len()))?;
            if read == 0 {
                return finish_at_end_of_stream(&buffer);
            }
            let received = chunk.get(..read).unwrap_or_default();
            if let Some(position) = received.iter().position(|byte| *byte == MESSAGE_TERMINATOR) {
                buffer.extend_from_slice(received.get(..position).unwrap_or_default());
                self.enforce_limit(buffer.len())?;
                return decode::<T>(&buffer)
                    .map(|decoded| Some(decoded.message))
                    .map_err(|error| FrameError::from_decode(error, buffer.len()));
            }
            buffer.extend_from_slice(received);
            self.enforce_limit(buffer.len())?;
        }
    }

    fn enforce_limit(&self, size: usize) -> Result<(), FrameError> {
        if size > self.max_bytes {
            return Err(FrameError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }
        Ok(())
    }
}

fn finish_at_end_of_stream<T: DeserializeOwned>(buffer: &[u8]) -> Result<Option<T>, FrameError> {
    if buffer.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    decode::<T>(buffer)
        .map(|decoded| Some(decoded.message))
        .map_err(|error| FrameError::from_decode(error, buffer.len()))
}

fn read_with_retry<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buffer) {
            Ok(read) => return Ok(read),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
}
