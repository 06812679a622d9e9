//! Bridge bootstrap orchestration.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use easel_config::{Config, EndpointParseError, FramingMode};
use easel_proto::{FrameReader, Framing};

use crate::dispatch::DispatchConnectionHandler;
use crate::health::HealthReporter;
use crate::host::HostNamespace;
use crate::marshal::{self, HostQueue};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::transport::{BridgeListener, ListenerError, ListenerHandle};

/// How long the host loop waits for work before re-checking for shutdown.
const HOST_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the bridge configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that returns a configuration resolved earlier.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The configured bridge address is malformed.
    #[error("invalid bridge endpoint: {source}")]
    Endpoint {
        /// Parse failure.
        #[source]
        source: EndpointParseError,
    },
    /// The listener could not bind or start.
    #[error("failed to start bridge listener: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
}

/// A bootstrapped bridge whose listener is bound but not yet accepting.
pub struct Bridge {
    config: Config,
    listener: BridgeListener,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Bridge {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Starts accepting connections.
    ///
    /// Requests are marshaled onto the returned bridge's host queue; nothing
    /// reaches the host graph until the caller serves that queue.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::Listener`] when the accept loop cannot start.
    pub fn start(self) -> Result<RunningBridge, BootstrapError> {
        let Self {
            config,
            listener,
            reporter,
            ..
        } = self;
        let (marshaler, queue) = marshal::channel();
        let reader = FrameReader::new(
            wire_framing(config.framing()),
            config.max_request_bytes(),
        );
        let handler = Arc::new(DispatchConnectionHandler::new(
            reader,
            config.read_timeout(),
            marshaler,
            Arc::clone(&reporter),
        ));
        let local_addr = listener.local_addr();
        let listener = match listener.start(handler) {
            Ok(handle) => handle,
            Err(source) => {
                let error = BootstrapError::Listener { source };
                reporter.bootstrap_failed(&error);
                return Err(error);
            }
        };
        Ok(RunningBridge {
            local_addr,
            listener,
            queue,
            reporter,
        })
    }
}

/// A bridge accepting connections.
///
/// Owns the host side of the work queue; the thread that holds it is the
/// host execution context.
pub struct RunningBridge {
    local_addr: SocketAddr,
    listener: ListenerHandle,
    queue: HostQueue,
    reporter: Arc<dyn HealthReporter>,
}

impl RunningBridge {
    /// Address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Host side of the work queue, for embedding in an existing event loop.
    #[must_use]
    pub const fn queue(&self) -> &HostQueue {
        &self.queue
    }

    /// Serves marshaled requests against `namespace` until `shutdown` is set.
    pub fn serve(&self, namespace: &dyn HostNamespace, shutdown: &AtomicBool) {
        self.queue.run_until(namespace, shutdown, HOST_POLL_INTERVAL);
    }

    /// Stops accepting connections and waits for the accept loop to exit.
    ///
    /// Connections still waiting on the host receive an unavailability error.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] if the accept loop panicked.
    pub fn stop(self) -> Result<(), ListenerError> {
        let Self {
            listener,
            queue,
            reporter,
            ..
        } = self;
        drop(queue);
        listener.shutdown();
        let joined = listener.join();
        reporter.listener_stopped();
        joined
    }
}

const fn wire_framing(mode: FramingMode) -> Framing {
    match mode {
        FramingMode::WholeBuffer => Framing::WholeBuffer,
        FramingMode::SingleShot => Framing::SingleShot,
        FramingMode::Delimited => Framing::Delimited,
    }
}

/// Bootstraps the bridge using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] when configuration, telemetry or binding fails.
/// Every failure is reported to `reporter` before it is returned.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Bridge, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let endpoint = match config.endpoint() {
        Ok(endpoint) => endpoint,
        Err(source) => {
            let error = BootstrapError::Endpoint { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let listener = match BridgeListener::bind(&endpoint) {
        Ok(listener) => listener,
        Err(source) => {
            let error = BootstrapError::Listener { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    reporter.bootstrap_succeeded(&config, &endpoint);
    reporter.listener_bound(listener.local_addr());
    Ok(Bridge {
        config,
        listener,
        telemetry,
        reporter,
    })
}
