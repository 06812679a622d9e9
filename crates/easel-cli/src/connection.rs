//! Controller-side connection to the host bridge.
//!
//! The bridge answers exactly one request per connection and then closes it,
//! so [`ConnectionManager`] opens a connection lazily for each call and always
//! discards it once the exchange ends, whether it succeeded or not.

use std::io;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use easel_config::{BridgeEndpoint, Config, EndpointParseError};
use easel_proto::{
    CallParams, CodecError, FrameError, FrameReader, Framing, Request, Response, WireValue,
    write_message,
};
use thiserror::Error;
use tracing::debug;

const CONNECTION_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::connection");

/// Errors reported by [`ConnectionManager::call`].
#[derive(Debug, Error)]
pub enum CallError {
    /// The configured bridge address is malformed.
    #[error("invalid bridge endpoint: {source}")]
    Endpoint {
        /// Parse failure.
        #[source]
        source: EndpointParseError,
    },
    /// The bridge host name did not resolve.
    #[error("failed to resolve bridge address {endpoint}: {source}")]
    Resolve {
        /// Configured endpoint.
        endpoint: String,
        /// Resolver failure.
        #[source]
        source: io::Error,
    },
    /// Opening the connection failed or timed out.
    #[error("failed to connect to bridge at {endpoint}: {source}")]
    Connect {
        /// Configured endpoint.
        endpoint: String,
        /// Socket failure.
        #[source]
        source: io::Error,
    },
    /// Writing the request failed.
    #[error("failed to send request: {source}")]
    Send {
        /// Encoder or socket failure.
        #[source]
        source: CodecError,
    },
    /// No complete response arrived within the receive bound.
    #[error("timed out after {timeout_ms} ms waiting for the bridge to respond")]
    Timeout {
        /// Receive bound that elapsed.
        timeout_ms: u128,
        /// Bytes received before the bound elapsed.
        received: usize,
    },
    /// The bridge closed the connection without sending anything.
    #[error("bridge closed the connection without a response")]
    ConnectionClosed,
    /// The bytes received do not form a response.
    #[error("failed to decode bridge response: {source}")]
    Decode {
        /// Framing or decode failure.
        #[source]
        source: FrameError,
    },
    /// Reading from the socket failed.
    #[error("failed to read bridge response: {source}")]
    Receive {
        /// Socket failure.
        #[source]
        source: io::Error,
    },
    /// The bridge answered with an error response.
    #[error("{message}")]
    Remote {
        /// Error message reported by the host.
        message: String,
        /// Host-side traceback, when one was captured.
        traceback: Option<String>,
    },
}

impl CallError {
    /// Returns true when the call gave up waiting for a response.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Host-side traceback carried by a remote failure.
    #[must_use]
    pub fn traceback(&self) -> Option<&str> {
        match self {
            Self::Remote { traceback, .. } => traceback.as_deref(),
            _ => None,
        }
    }
}

/// Owns the controller's connection to the bridge.
///
/// Constructed once per controller process and passed to callers by
/// reference. Each [`call`](Self::call) opens a fresh connection when none
/// is cached and closes it before returning.
#[derive(Debug)]
pub struct ConnectionManager {
    endpoint: BridgeEndpoint,
    connect_timeout: Duration,
    response_timeout: Duration,
    reader: FrameReader,
    connection: Option<TcpStream>,
}

impl ConnectionManager {
    /// Creates a manager for `endpoint` with explicit bounds.
    #[must_use]
    pub fn new(
        endpoint: BridgeEndpoint,
        connect_timeout: Duration,
        response_timeout: Duration,
        max_response_bytes: usize,
    ) -> Self {
        Self {
            endpoint,
            connect_timeout,
            response_timeout,
            reader: FrameReader::new(Framing::WholeBuffer, max_response_bytes),
            connection: None,
        }
    }

    /// Creates a manager from the shared configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Endpoint`] when the configured bridge URL does
    /// not parse.
    pub fn from_config(config: &Config) -> Result<Self, CallError> {
        let endpoint = config
            .endpoint()
            .map_err(|source| CallError::Endpoint { source })?;
        Ok(Self::new(
            endpoint,
            config.connect_timeout(),
            config.response_timeout(),
            config.max_response_bytes(),
        ))
    }

    /// Endpoint this manager connects to.
    #[must_use]
    pub const fn endpoint(&self) -> &BridgeEndpoint {
        &self.endpoint
    }

    /// Returns true while a connection is cached.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Opens a connection unless one is already cached.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Resolve`] or [`CallError::Connect`] when the
    /// bridge cannot be reached within the connect bound.
    pub fn connect(&mut self) -> Result<(), CallError> {
        if self.connection.is_some() {
            return Ok(());
        }
        let endpoint = self.endpoint.to_string();
        let address = resolve_tcp_address(&self.endpoint.host, self.endpoint.port).map_err(
            |source| CallError::Resolve {
                endpoint: endpoint.clone(),
                source,
            },
        )?;
        let stream = TcpStream::connect_timeout(&address, self.connect_timeout)
            .and_then(|stream| {
                stream.set_read_timeout(non_zero(self.response_timeout))?;
                stream.set_write_timeout(non_zero(self.connect_timeout))?;
                Ok(stream)
            })
            .map_err(|source| CallError::Connect { endpoint, source })?;
        debug!(target: CONNECTION_TARGET, %address, "connected to bridge");
        self.connection = Some(stream);
        Ok(())
    }

    /// Drops the cached connection, if any.
    pub fn close(&mut self) {
        if let Some(stream) = self.connection.take() {
            if let Err(error) = stream.shutdown(Shutdown::Both) {
                debug!(target: CONNECTION_TARGET, %error, "connection already closed");
            }
        }
    }

    /// Sends one request and waits for its response.
    ///
    /// The connection is discarded afterwards in every case. No retry is
    /// attempted; a timed-out call may still complete on the host.
    ///
    /// # Errors
    ///
    /// Returns [`CallError`] for transport failures, timeouts, undecodable
    /// responses and error responses from the host.
    pub fn call(&mut self, params: CallParams) -> Result<WireValue, CallError> {
        let operation_path = params.operation_path.clone();
        let outcome = self.exchange(&Request::call(params));
        self.close();
        debug!(
            target: CONNECTION_TARGET,
            operation_path,
            succeeded = outcome.is_ok(),
            "bridge call finished"
        );
        match outcome? {
            Response::Success { result } => Ok(result),
            Response::Error { error, traceback } => Err(CallError::Remote {
                message: error,
                traceback,
            }),
        }
    }

    fn exchange(&mut self, request: &Request) -> Result<Response, CallError> {
        self.connect()?;
        let Some(stream) = self.connection.as_mut() else {
            return Err(CallError::ConnectionClosed);
        };
        write_message(stream, request).map_err(|source| CallError::Send { source })?;
        match self.reader.read_message::<Response, _>(stream) {
            Ok(Some(response)) => Ok(response),
            Ok(None) => Err(CallError::ConnectionClosed),
            Err(FrameError::TimedOut { received }) => Err(CallError::Timeout {
                timeout_ms: self.response_timeout.as_millis(),
                received,
            }),
            Err(FrameError::Io(source)) => Err(CallError::Receive { source }),
            Err(source) => Err(CallError::Decode { source }),
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close();
    }
}

const fn non_zero(duration: Duration) -> Option<Duration> {
    if duration.is_zero() {
        None
    } else {
        Some(duration)
    }
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    let mut addrs = (host, port).to_socket_addrs()?;
    addrs
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}
