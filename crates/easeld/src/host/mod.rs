//! Capability interface over the host application's object graph.
//!
//! The resolver never touches host internals directly. It walks a graph of
//! [`HostNode`]s rooted in a [`HostNamespace`], asking each node for named
//! members, whether it can be invoked, and which parameters it declares.
//! Adapters over a real host implement these traits; [`NamespaceNode`] and
//! [`FunctionNode`] assemble graphs for the demo host and for tests.
//!
//! Host values hold nodes behind [`std::rc::Rc`], so they are `!Send` and stay
//! on the host execution context. Only wire values cross threads.

mod errors;
mod node;
mod value;

pub use self::errors::InvocationError;
pub use self::node::{
    Arguments, FunctionNode, HostNamespace, HostNode, NamespaceNode, StaticNamespace,
};
pub use self::value::{HostKwargs, HostValue};

#[cfg(test)]
pub(crate) use self::node::MockHostNode;
