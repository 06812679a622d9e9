//! Request dispatch for bridge connections.
//!
//! Each accepted connection carries exactly one request:
//!
//! ```json
//! {"type":"call_api","params":{"api_path":"Studio.Image.get_width","args":[],"kwargs":{"image_id":1}}}
//! ```
//!
//! The handler frames and decodes it on the connection thread, marshals the
//! resolve-and-invoke step onto the host execution context, writes exactly
//! one response and closes the connection:
//!
//! ```json
//! {"status":"success","result":640}
//! ```
//!
//! Malformed, truncated or oversized requests close the connection without a
//! reply. Every decodable request gets a reply, including resolver and host
//! failures.

mod errors;
mod execute;
mod handler;

pub use self::errors::DispatchError;
pub use self::execute::execute_call;
pub(crate) use self::handler::DispatchConnectionHandler;

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
