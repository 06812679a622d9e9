//! Wire protocol shared by the Easel host bridge and its controllers.
//!
//! Every exchange is one request followed by one response on a fresh TCP
//! connection. Messages are UTF-8 JSON documents. Senders terminate each
//! message with a newline so that all three receiver framings in [`frame`]
//! accept them:
//!
//! ```json
//! {"type":"call_api","params":{"api_path":"Studio.Image.get_name","args":[],"kwargs":{"image_id":1}}}
//! {"status":"success","result":"Untitled"}
//! ```
//!
//! Results are reduced to [`WireValue`]s before they leave the host; anything
//! that is not a plain scalar or a list travels as a [`HandleDescriptor`].

pub mod codec;
pub mod frame;
pub mod message;
pub mod value;

pub use codec::{CodecError, DecodeError, Decoded, decode, encode, write_message};
pub use frame::{FrameError, FrameReader, Framing};
pub use message::{CALL_API, CONTEXT_HANDLE_KEY, CallParams, Kwargs, Request, Response};
pub use value::{HandleDescriptor, WireValue};

/// Protocol revision spoken by this crate.
pub const PROTOCOL_VERSION: &str = "1.0.0";
