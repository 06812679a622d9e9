//! Built-in configuration defaults.

use crate::endpoint::BridgeEndpoint;
use crate::framing::FramingMode;
use crate::logging::LogFormat;

/// Loopback host the bridge binds to and connects to by default.
pub const DEFAULT_BRIDGE_HOST: &str = "127.0.0.1";

/// Well-known TCP port of the bridge listener.
pub const DEFAULT_BRIDGE_PORT: u16 = 9877;

/// Root segment every operation path is anchored at.
pub const DEFAULT_ROOT_NAMESPACE: &str = "Studio";

/// Bounded wait for a response on the controller side.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 10_000;

/// Bounded wait for establishing a controller connection.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Bounded wait for request bytes on the host side.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 10_000;

/// Upper bound on a single framed request read by the host.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Upper bound on a single response read by the controller.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned bridge host used where allocation is required (e.g. serde).
pub fn default_bridge_host() -> String {
    DEFAULT_BRIDGE_HOST.to_owned()
}

/// Owned root namespace used where allocation is required.
pub fn default_root_namespace() -> String {
    DEFAULT_ROOT_NAMESPACE.to_owned()
}

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default request framing on the host side.
pub fn default_framing() -> FramingMode {
    FramingMode::WholeBuffer
}

/// Computes the default bridge endpoint.
pub fn default_endpoint() -> BridgeEndpoint {
    BridgeEndpoint::new(DEFAULT_BRIDGE_HOST, DEFAULT_BRIDGE_PORT)
}
