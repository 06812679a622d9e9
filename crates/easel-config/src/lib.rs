//! Layered configuration shared by the Easel host bridge and its controller.
//!
//! Values are merged from built-in defaults, an optional TOML file, `EASEL_*`
//! environment variables and command-line flags, in increasing order of
//! precedence. Both binaries load the same [`Config`] so the controller and
//! the host agree on the endpoint and the root namespace without any
//! discovery protocol.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod endpoint;
mod framing;
mod logging;

pub use defaults::{
    DEFAULT_BRIDGE_HOST, DEFAULT_BRIDGE_PORT, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_LOG_FILTER,
    DEFAULT_MAX_REQUEST_BYTES, DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_READ_TIMEOUT_MS,
    DEFAULT_RESPONSE_TIMEOUT_MS, DEFAULT_ROOT_NAMESPACE, default_bridge_host, default_endpoint,
    default_framing, default_log_filter, default_log_filter_string, default_log_format,
    default_root_namespace,
};
pub use endpoint::{BridgeEndpoint, EndpointParseError};
pub use framing::FramingMode;
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration for the bridge host and controller.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "EASEL")]
pub struct Config {
    /// Host the listener binds to and the controller connects to.
    #[ortho_config(default = default_bridge_host())]
    pub bridge_host: String,
    /// TCP port of the bridge listener.
    #[ortho_config(default = DEFAULT_BRIDGE_PORT)]
    pub bridge_port: u16,
    /// Bridge address written as `tcp://host:port`.
    ///
    /// Takes precedence over `bridge_host` and `bridge_port` when set.
    pub bridge_url: Option<String>,
    /// Root segment operation paths are anchored at.
    #[ortho_config(default = default_root_namespace())]
    pub root_namespace: String,
    /// Controller receive bound in milliseconds.
    #[ortho_config(default = DEFAULT_RESPONSE_TIMEOUT_MS)]
    pub response_timeout_ms: u64,
    /// Controller connect bound in milliseconds.
    #[ortho_config(default = DEFAULT_CONNECT_TIMEOUT_MS)]
    pub connect_timeout_ms: u64,
    /// Host-side read bound for a single request, in milliseconds.
    #[ortho_config(default = DEFAULT_READ_TIMEOUT_MS)]
    pub read_timeout_ms: u64,
    /// Request framing used by the host listener.
    #[ortho_config(default = default_framing())]
    pub framing: FramingMode,
    /// Largest request the host accepts, in bytes.
    #[ortho_config(default = DEFAULT_MAX_REQUEST_BYTES)]
    pub max_request_bytes: usize,
    /// Largest response the controller accepts, in bytes.
    ///
    /// Kept separate from `max_request_bytes` because replies such as image
    /// listings can be far larger than any request.
    #[ortho_config(default = DEFAULT_MAX_RESPONSE_BYTES)]
    pub max_response_bytes: usize,
    /// `tracing` filter directive.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bridge_host: default_bridge_host(),
            bridge_port: DEFAULT_BRIDGE_PORT,
            bridge_url: None,
            root_namespace: default_root_namespace(),
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            framing: default_framing(),
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Endpoint shared by the listener and the controller.
    ///
    /// `bridge_url` wins over the host and port fields when it is set.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointParseError`] when `bridge_url` is not a
    /// `tcp://host:port` address.
    pub fn endpoint(&self) -> Result<BridgeEndpoint, EndpointParseError> {
        match &self.bridge_url {
            Some(url) => url.parse(),
            None => Ok(BridgeEndpoint::new(self.bridge_host.clone(), self.bridge_port)),
        }
    }

    /// Root namespace identifier.
    #[must_use]
    pub fn root_namespace(&self) -> &str {
        &self.root_namespace
    }

    /// Bounded wait for one response on the controller side.
    #[must_use]
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    /// Bounded wait for establishing a controller connection.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Bounded wait for request bytes on the host side.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Request framing used by the listener.
    #[must_use]
    pub fn framing(&self) -> FramingMode {
        self.framing
    }

    /// Largest request the host accepts, in bytes.
    #[must_use]
    pub fn max_request_bytes(&self) -> usize {
        self.max_request_bytes
    }

    /// Largest response the controller accepts, in bytes.
    #[must_use]
    pub fn max_response_bytes(&self) -> usize {
        self.max_response_bytes
    }

    /// `tracing` filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
