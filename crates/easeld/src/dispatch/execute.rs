//! Resolve, invoke and serialize one call on the host execution context.

use easel_proto::{CallParams, Response};
use tracing::debug;

use crate::host::{HostKwargs, HostNamespace, HostValue};
use crate::resolver::resolve_and_invoke;
use crate::serializer::serialize;

use super::DISPATCH_TARGET;

/// Runs a `call_api` request against `namespace` and builds its response.
///
/// Must run on the host execution context. Resolver and host failures become
/// error responses; nothing escapes.
#[must_use]
pub fn execute_call(namespace: &dyn HostNamespace, params: CallParams) -> Response {
    let CallParams {
        operation_path,
        args,
        kwargs,
    } = params;
    let args = args.into_iter().map(HostValue::from_json).collect();
    let kwargs: HostKwargs = kwargs
        .into_iter()
        .map(|(name, value)| (name, HostValue::from_json(value)))
        .collect();

    match resolve_and_invoke(namespace, &operation_path, args, kwargs) {
        Ok(value) => Response::success(serialize(&value)),
        Err(error) => {
            debug!(
                target: DISPATCH_TARGET,
                operation_path,
                error = %error,
                "operation failed"
            );
            Response::error_with_traceback(error.to_string(), error.traceback().map(str::to_owned))
        }
    }
}
