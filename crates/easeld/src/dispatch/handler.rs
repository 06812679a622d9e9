//! Connection handler that serves one bridge request per connection.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use easel_proto::{FrameReader, Request, Response, write_message};
use tracing::{debug, warn};

use crate::health::HealthReporter;
use crate::marshal::Marshaler;
use crate::transport::ConnectionHandler;

use super::errors::DispatchError;
use super::execute::execute_call;
use super::DISPATCH_TARGET;

/// Connection handler that decodes a request, marshals it onto the host and
/// replies once.
pub(crate) struct DispatchConnectionHandler {
    reader: FrameReader,
    read_timeout: Duration,
    marshaler: Marshaler,
    reporter: Arc<dyn HealthReporter>,
}

impl DispatchConnectionHandler {
    pub(crate) fn new(
        reader: FrameReader,
        read_timeout: Duration,
        marshaler: Marshaler,
        reporter: Arc<dyn HealthReporter>,
    ) -> Self {
        Self {
            reader,
            read_timeout,
            marshaler,
            reporter,
        }
    }

    fn dispatch(&self, mut stream: TcpStream) -> Result<(), DispatchError> {
        let timeout = (!self.read_timeout.is_zero()).then_some(self.read_timeout);
        stream
            .set_read_timeout(timeout)
            .map_err(DispatchError::Configure)?;

        self.exchange(&mut stream)?;

        if let Err(error) = stream.shutdown(Shutdown::Both) {
            debug!(target: DISPATCH_TARGET, %error, "connection already closed");
        }
        Ok(())
    }

    /// Reads one request and writes its response.
    ///
    /// A request only counts as handled once its response has been written.
    fn exchange<S: Read + Write>(&self, stream: &mut S) -> Result<(), DispatchError> {
        let Some(request) = self.reader.read_message::<Request, _>(stream)? else {
            debug!(target: DISPATCH_TARGET, "client disconnected without request");
            return Ok(());
        };

        let operation_path = request.params.operation_path.clone();
        let response = self.respond(request);
        write_message(stream, &response)?;
        self.reporter
            .request_handled(&operation_path, response.is_success());
        Ok(())
    }

    fn respond(&self, request: Request) -> Response {
        if !request.is_call() {
            let error = DispatchError::unsupported_type(request.kind);
            warn!(target: DISPATCH_TARGET, %error, "rejecting request");
            return Response::error(error.to_string());
        }
        let params = request.params;
        debug!(
            target: DISPATCH_TARGET,
            operation_path = %params.operation_path,
            "dispatching request"
        );
        self.marshaler
            .run(move |namespace| execute_call(namespace, params))
            .unwrap_or_else(|error| {
                warn!(target: DISPATCH_TARGET, %error, "marshaled call failed");
                Response::error(error.to_string())
            })
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: TcpStream) {
        if let Ok(peer) = stream.peer_addr() {
            self.reporter.connection_accepted(peer);
        }
        if let Err(error) = self.dispatch(stream) {
            self.reporter.request_rejected(&error);
        }
    }
}
