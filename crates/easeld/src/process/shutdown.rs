//! Termination signal handling for the bridge process.

use std::ffi::c_int;
use std::io;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use signal_hook::low_level::signal_name;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

const TERMINATION_SIGNALS: [c_int; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Blocks the caller until the bridge should stop serving.
#[cfg_attr(test, mockall::automock)]
pub trait ShutdownSignal: Send + Sync {
    /// Returns once a stop has been requested.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError`] when the notification source cannot be
    /// registered. Callers treat that as a stop request.
    fn wait(&self) -> Result<(), ShutdownError>;
}

/// Errors reported by shutdown signal sources.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Registering the signal handlers failed.
    #[error("failed to register termination signal handlers: {source}")]
    Register {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Waits for SIGTERM, SIGINT, SIGQUIT or SIGHUP.
#[derive(Debug, Clone, Copy)]
pub struct SystemShutdownSignal {
    signals: &'static [c_int],
}

impl SystemShutdownSignal {
    /// Builds a listener for the standard termination signals.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            signals: &TERMINATION_SIGNALS,
        }
    }
}

impl Default for SystemShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let mut signals =
            Signals::new(self.signals).map_err(|source| ShutdownError::Register { source })?;
        if let Some(signal) = signals.forever().next() {
            info!(
                target: PROCESS_TARGET,
                signal = signal_name(signal).unwrap_or("unknown"),
                "stopping bridge"
            );
        }
        Ok(())
    }
}
