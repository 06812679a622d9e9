//! Error surface for launching and supervising the bridge process.

use std::io;

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

/// Errors surfaced while launching or supervising the bridge.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrap failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// The shutdown watcher thread could not be spawned.
    #[error("failed to spawn shutdown watcher: {source}")]
    Watcher {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The listener did not stop cleanly.
    #[error("failed to stop bridge listener: {source}")]
    Stop {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
}
