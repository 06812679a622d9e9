//! Marshaling of work onto the host execution context.
//!
//! Connection threads never touch the host graph. They post a unit of work
//! through a [`Marshaler`] and block until the single thread that owns the
//! [`HostQueue`] has run it. The host drains the queue between iterations of
//! its own event loop, so at most one unit of work is in flight at a time.

mod errors;
mod queue;

pub use self::errors::MarshalError;
pub use self::queue::{HostQueue, Marshaler, channel};

const MARSHAL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::marshal");
