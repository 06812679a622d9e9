//! Process supervision: runs the bridge until a termination signal arrives.

mod errors;
mod launch;
mod shutdown;

pub use self::errors::LaunchError;
pub use self::launch::run_bridge;
pub(crate) use self::launch::run_bridge_with;
pub use self::shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};
#[cfg(test)]
pub(crate) use self::shutdown::MockShutdownSignal;

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
