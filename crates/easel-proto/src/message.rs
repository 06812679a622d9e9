//! Request and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::value::WireValue;

/// The only request type the bridge dispatches.
pub const CALL_API: &str = "call_api";

/// Keyword argument naming the host context a call operates on.
pub const CONTEXT_HANDLE_KEY: &str = "image_id";

/// Keyword arguments carried by a call.
pub type Kwargs = Map<String, Value>;

/// Parameters of a `call_api` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallParams {
    /// Dotted path from the root namespace to the target operation.
    ///
    /// The first segment names the root namespace and is ignored by the
    /// resolver.
    #[serde(rename = "api_path", alias = "operation_path", default)]
    pub operation_path: String,
    /// Positional arguments.
    #[serde(default)]
    pub args: Vec<Value>,
    /// Keyword arguments.
    #[serde(default)]
    pub kwargs: Kwargs,
}

impl CallParams {
    /// Builds parameters for `operation_path` with no arguments.
    #[must_use]
    pub fn new(operation_path: impl Into<String>) -> Self {
        Self {
            operation_path: operation_path.into(),
            args: Vec::new(),
            kwargs: Map::new(),
        }
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Sets a keyword argument.
    #[must_use]
    pub fn with_kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    /// Returns the context handle carried in the keyword arguments, if any.
    #[must_use]
    pub fn context_handle(&self) -> Option<&Value> {
        self.kwargs.get(CONTEXT_HANDLE_KEY)
    }
}

/// A controller-to-host request.
///
/// Decoding also accepts the flat legacy layout in which `api_path`, `args`
/// and `kwargs` sit beside `type` instead of inside `params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRequest")]
pub struct Request {
    /// Request type; always [`CALL_API`] for dispatchable requests.
    #[serde(rename = "type")]
    pub kind: String,
    /// Call parameters.
    pub params: CallParams,
}

impl Request {
    /// Builds a `call_api` request.
    #[must_use]
    pub fn call(params: CallParams) -> Self {
        Self {
            kind: CALL_API.to_owned(),
            params,
        }
    }

    /// Returns `true` when the request type is [`CALL_API`].
    #[must_use]
    pub fn is_call(&self) -> bool {
        self.kind == CALL_API
    }
}

#[derive(Deserialize)]
struct RawRequest {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    params: Option<Value>,
    #[serde(rename = "api_path", alias = "operation_path", default)]
    operation_path: Option<String>,
    #[serde(default)]
    args: Option<Vec<Value>>,
    #[serde(default)]
    kwargs: Option<Kwargs>,
}

impl TryFrom<RawRequest> for Request {
    type Error = serde_json::Error;

    fn try_from(raw: RawRequest) -> Result<Self, Self::Error> {
        let kind = raw.kind.unwrap_or_else(|| CALL_API.to_owned());
        let params = match raw.params {
            Some(Value::Object(map)) if !map.is_empty() => {
                serde_json::from_value(Value::Object(map))?
            }
            Some(Value::Object(_) | Value::Null) | None => CallParams {
                operation_path: raw.operation_path.unwrap_or_default(),
                args: raw.args.unwrap_or_default(),
                kwargs: raw.kwargs.unwrap_or_default(),
            },
            Some(other) => serde_json::from_value(other)?,
        };
        Ok(Self { kind, params })
    }
}

/// A host-to-controller response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    /// The call completed and produced `result`.
    Success {
        /// Wire-safe call result.
        #[serde(default)]
        result: WireValue,
    },
    /// The call failed.
    Error {
        /// Human-readable failure description.
        error: String,
        /// Host diagnostic trace, when one was captured.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        traceback: Option<String>,
    },
}

impl Response {
    /// Builds a success response.
    #[must_use]
    pub fn success(result: impl Into<WireValue>) -> Self {
        Self::Success {
            result: result.into(),
        }
    }

    /// Builds an error response without a traceback.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
            traceback: None,
        }
    }

    /// Builds an error response carrying a host traceback.
    #[must_use]
    pub fn error_with_traceback(message: impl Into<String>, traceback: Option<String>) -> Self {
        Self::Error {
            error: message.into(),
            traceback,
        }
    }

    /// Returns `true` for success responses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
