//! Host-side command bridge for the Easel image editor.
//!
//! `easeld` lets an out-of-process controller drive a host application's
//! scripting API over a local TCP connection. Each connection carries one
//! JSON request naming an operation by dotted path, for example
//! `Studio.Image.get_width`. The bridge decodes the request on the connection
//! thread, marshals the resolve-and-invoke step onto the single thread that
//! owns the host graph, serializes the result and writes exactly one reply
//! before closing the connection.
//!
//! The crate is split along those stages:
//!
//! - [`host`] is the capability interface the resolver walks. Adapters over a
//!   real host implement [`host::HostNode`] and [`host::HostNamespace`].
//! - [`resolver`] walks operation paths, substitutes context handles and
//!   invokes the target.
//! - [`serialize`] reduces host results to wire values.
//! - [`marshal`] moves work from connection threads onto the host execution
//!   context.
//! - [`studio`] is a self-contained demo host used by the `easeld` binary.
//!
//! Bootstrap follows a fixed order: load configuration, initialise
//! telemetry, bind the listener. Each stage reports through a
//! [`HealthReporter`] so failures are visible before the process exits.

mod bootstrap;
mod dispatch;
mod health;
pub mod host;
pub mod marshal;
mod process;
pub mod resolver;
mod serializer;
pub mod studio;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, Bridge, ConfigLoader, RunningBridge, StaticConfigLoader, SystemConfigLoader,
    bootstrap_with,
};
pub use dispatch::{DispatchError, execute_call};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_bridge};
pub use serializer::serialize;
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
