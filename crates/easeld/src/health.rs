//! Structured health reporting for bridge lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use easel_config::{BridgeEndpoint, Config};

use crate::bootstrap::BootstrapError;
use crate::dispatch::DispatchError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
#[cfg_attr(test, mockall::automock)]
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config, endpoint: &BridgeEndpoint);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the listener socket is bound.
    fn listener_bound(&self, address: SocketAddr);

    /// Invoked after the accept loop has stopped.
    fn listener_stopped(&self);

    /// Invoked when a connection is handed to a handler.
    fn connection_accepted(&self, peer: SocketAddr);

    /// Invoked after a reply has been produced for a request.
    fn request_handled(&self, operation_path: &str, succeeded: bool);

    /// Invoked when a connection is closed without a reply.
    fn request_rejected(&self, error: &DispatchError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config, endpoint: &BridgeEndpoint) {
        (**self).bootstrap_succeeded(config, endpoint);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn listener_bound(&self, address: SocketAddr) {
        (**self).listener_bound(address);
    }

    fn listener_stopped(&self) {
        (**self).listener_stopped();
    }

    fn connection_accepted(&self, peer: SocketAddr) {
        (**self).connection_accepted(peer);
    }

    fn request_handled(&self, operation_path: &str, succeeded: bool) {
        (**self).request_handled(operation_path, succeeded);
    }

    fn request_rejected(&self, error: &DispatchError) {
        (**self).request_rejected(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting bridge bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config, endpoint: &BridgeEndpoint) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            endpoint = %endpoint,
            root_namespace = config.root_namespace(),
            framing = %config.framing(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "bridge bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "bridge bootstrap failed"
        );
    }

    fn listener_bound(&self, address: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_bound",
            %address,
            "bridge listener bound"
        );
    }

    fn listener_stopped(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_stopped",
            "bridge listener stopped"
        );
    }

    fn connection_accepted(&self, peer: SocketAddr) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "connection_accepted",
            %peer,
            "connection accepted"
        );
    }

    fn request_handled(&self, operation_path: &str, succeeded: bool) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "request_handled",
            operation_path,
            succeeded,
            "request handled"
        );
    }

    fn request_rejected(&self, error: &DispatchError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "request_rejected",
            error = %error,
            "connection closed without reply"
        );
    }
}
