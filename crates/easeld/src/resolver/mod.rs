//! Operation path resolution against the live host graph.
//!
//! A path such as `Studio.Image.get_name` is split on `.`; the first segment
//! names the root and is skipped, and every following segment is looked up on
//! the value reached so far. The final value is invoked when it is callable
//! and returned as-is otherwise.
//!
//! The `image_id` keyword is reserved. When present it is resolved through
//! [`HostNamespace::context_by_id`] before the walk and removed from the
//! keyword set. If the target declares an `image` parameter, the resolved
//! object is spliced into the first positional slot, overwriting whatever
//! was there.

use std::rc::Rc;

use easel_proto::CONTEXT_HANDLE_KEY;
use thiserror::Error;

use crate::host::{HostKwargs, HostNamespace, HostNode, HostValue, InvocationError};

/// Parameter name that receives the resolved context object.
pub const CONTEXT_PARAMETER: &str = "image";

/// Errors raised while resolving or invoking an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The operation path was empty.
    #[error("operation path is empty")]
    EmptyPath,
    /// A path segment did not resolve.
    #[error("cannot resolve '{segment}' in operation path '{path}'")]
    UnknownSegment {
        /// Full operation path.
        path: String,
        /// First segment that failed to resolve.
        segment: String,
    },
    /// The context handle was not an integer.
    #[error("context handle '{key}' must be an integer, got {value}")]
    InvalidContextHandle {
        /// Reserved keyword name.
        key: String,
        /// Supplied value.
        value: String,
    },
    /// No live context object has the given id.
    #[error("no context object with id {id}")]
    UnknownContext {
        /// Requested id.
        id: i64,
    },
    /// The target is not callable but arguments were supplied.
    #[error("'{path}' is not callable but was given arguments")]
    ArgumentsForAttribute {
        /// Full operation path.
        path: String,
    },
    /// The host call itself failed.
    #[error(transparent)]
    Invocation(#[from] InvocationError),
}

impl ResolveError {
    /// Returns the host traceback carried by invocation failures.
    #[must_use]
    pub fn traceback(&self) -> Option<&str> {
        match self {
            Self::Invocation(error) => error.traceback(),
            _ => None,
        }
    }
}

/// Resolves `operation_path` and invokes or reads the target.
///
/// # Errors
///
/// Returns [`ResolveError`] when the path, the context handle or the host
/// call fails.
pub fn resolve_and_invoke(
    namespace: &dyn HostNamespace,
    operation_path: &str,
    mut args: Vec<HostValue>,
    mut kwargs: HostKwargs,
) -> Result<HostValue, ResolveError> {
    let context = take_context(namespace, &mut kwargs)?;
    let target = resolve(namespace, operation_path)?;

    let node = match &target {
        HostValue::Object(node) if node.is_invocable() => Rc::clone(node),
        _ => {
            if !args.is_empty() || !kwargs.is_empty() {
                return Err(ResolveError::ArgumentsForAttribute {
                    path: operation_path.to_owned(),
                });
            }
            return Ok(target);
        }
    };

    if let Some(context) = context
        && declares_context(node.as_ref())
    {
        match args.first_mut() {
            Some(first) => *first = context,
            None => args.push(context),
        }
    }

    Ok(node.invoke(args, kwargs)?)
}

/// Walks `operation_path` from the namespace root without invoking anything.
///
/// # Errors
///
/// Returns [`ResolveError::EmptyPath`] or [`ResolveError::UnknownSegment`].
pub fn resolve(
    namespace: &dyn HostNamespace,
    operation_path: &str,
) -> Result<HostValue, ResolveError> {
    if operation_path.trim().is_empty() {
        return Err(ResolveError::EmptyPath);
    }
    let mut current = HostValue::Object(namespace.root());
    for segment in operation_path.split('.').skip(1) {
        current = member(&current, segment).ok_or_else(|| ResolveError::UnknownSegment {
            path: operation_path.to_owned(),
            segment: segment.to_owned(),
        })?;
    }
    Ok(current)
}

fn member(value: &HostValue, name: &str) -> Option<HostValue> {
    match value {
        HostValue::Object(node) => node.lookup(name),
        HostValue::Map(entries) => entries.get(name).cloned(),
        _ => None,
    }
}

fn take_context(
    namespace: &dyn HostNamespace,
    kwargs: &mut HostKwargs,
) -> Result<Option<HostValue>, ResolveError> {
    let Some(handle) = kwargs.remove(CONTEXT_HANDLE_KEY) else {
        return Ok(None);
    };
    let id = handle
        .as_i64()
        .ok_or_else(|| ResolveError::InvalidContextHandle {
            key: CONTEXT_HANDLE_KEY.to_owned(),
            value: format!("{handle:?}"),
        })?;
    namespace
        .context_by_id(id)
        .map(Some)
        .ok_or(ResolveError::UnknownContext { id })
}

fn declares_context(node: &dyn HostNode) -> bool {
    node.parameters()
        .iter()
        .any(|parameter| parameter == CONTEXT_PARAMETER)
}
