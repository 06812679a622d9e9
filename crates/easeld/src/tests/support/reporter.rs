//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use easel_config::{BridgeEndpoint, Config};

use crate::bootstrap::BootstrapError;
use crate::dispatch::DispatchError;
use crate::health::HealthReporter;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Bootstrap completed successfully.
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// The listener bound an address.
    ListenerBound(SocketAddr),
    /// The listener stopped.
    ListenerStopped,
    /// A connection reached the dispatch handler.
    ConnectionAccepted(SocketAddr),
    /// A request was answered.
    RequestHandled { operation_path: String, succeeded: bool },
    /// A request was dropped without a reply.
    RequestRejected(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    /// Address reported by the listener, if it has bound yet.
    #[must_use]
    pub fn bound_address(&self) -> Option<SocketAddr> {
        self.events().into_iter().find_map(|event| match event {
            HealthEvent::ListenerBound(address) => Some(address),
            _ => None,
        })
    }

    /// Polls until the listener reports its address.
    pub fn wait_for_address(&self, timeout: Duration) -> SocketAddr {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(address) = self.bound_address() {
                return address;
            }
            assert!(Instant::now() < deadline, "listener never bound");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config, _endpoint: &BridgeEndpoint) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn listener_bound(&self, address: SocketAddr) {
        self.record(HealthEvent::ListenerBound(address));
    }

    fn listener_stopped(&self) {
        self.record(HealthEvent::ListenerStopped);
    }

    fn connection_accepted(&self, peer: SocketAddr) {
        self.record(HealthEvent::ConnectionAccepted(peer));
    }

    fn request_handled(&self, operation_path: &str, succeeded: bool) {
        self.record(HealthEvent::RequestHandled {
            operation_path: operation_path.to_owned(),
            succeeded,
        });
    }

    fn request_rejected(&self, error: &DispatchError) {
        self.record(HealthEvent::RequestRejected(error.to_string()));
    }
}
