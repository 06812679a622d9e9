//! Errors raised while marshaling work onto the host.

use thiserror::Error;

/// Failures surfaced by [`super::Marshaler`] and [`super::HostQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MarshalError {
    /// The host execution loop is gone or abandoned the work.
    #[error("host execution context is unavailable")]
    Unavailable,
    /// Every submitter has been dropped; no further work can arrive.
    #[error("all work submitters have disconnected")]
    Disconnected,
}
