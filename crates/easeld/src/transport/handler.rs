//! Connection handling seam for the listener.

use std::net::TcpStream;

/// Handles accepted connections.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Serves a single connection. Implementations should avoid panicking.
    fn handle(&self, stream: TcpStream);
}
