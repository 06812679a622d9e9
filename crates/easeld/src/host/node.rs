//! Graph nodes and the namespace that roots them.

use std::collections::BTreeMap;
use std::rc::Rc;

use super::errors::InvocationError;
use super::value::{HostKwargs, HostValue};

/// A member of the host object graph.
#[cfg_attr(test, mockall::automock)]
pub trait HostNode {
    /// Looks up a named member.
    fn lookup(&self, name: &str) -> Option<HostValue>;

    /// Returns `true` when the node can be invoked.
    fn is_invocable(&self) -> bool {
        false
    }

    /// Declared parameter names, in positional order.
    fn parameters(&self) -> Vec<String> {
        Vec::new()
    }

    /// Invokes the node positionally with `args`, then by keyword with `kwargs`.
    ///
    /// # Errors
    ///
    /// Returns the host's own [`InvocationError`] when binding or execution
    /// fails.
    fn invoke(&self, args: Vec<HostValue>, kwargs: HostKwargs) -> Result<HostValue, InvocationError> {
        let _ = (args, kwargs);
        Err(InvocationError::NotInvocable { kind: self.kind() })
    }

    /// Host identity, when the node exposes one.
    fn identity(&self) -> Option<i64> {
        None
    }

    /// Runtime kind of the node.
    fn kind(&self) -> String;

    /// Textual fallback used when the node cannot be sent as a handle.
    fn describe(&self) -> String {
        format!("<{} object>", self.kind())
    }
}

/// Root of the host graph plus the context lookup collaborator.
pub trait HostNamespace {
    /// The fixed root node that operation paths are anchored at.
    fn root(&self) -> Rc<dyn HostNode>;

    /// Resolves a live context object by its integer id.
    fn context_by_id(&self, id: i64) -> Option<HostValue>;
}

/// A node exposing a fixed set of named members.
#[derive(Debug, Clone)]
pub struct NamespaceNode {
    kind: String,
    identity: Option<i64>,
    members: BTreeMap<String, HostValue>,
}

impl NamespaceNode {
    /// Builds an empty namespace of the given kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            identity: None,
            members: BTreeMap::new(),
        }
    }

    /// Gives the node a host identity.
    #[must_use]
    pub const fn with_identity(mut self, id: i64) -> Self {
        self.identity = Some(id);
        self
    }

    /// Adds a member value.
    #[must_use]
    pub fn with_member(mut self, name: impl Into<String>, value: impl Into<HostValue>) -> Self {
        self.members.insert(name.into(), value.into());
        self
    }

    /// Adds a callable member named after the function.
    #[must_use]
    pub fn with_function(mut self, function: FunctionNode) -> Self {
        let name = function.name.clone();
        self.members.insert(name, HostValue::object(function));
        self
    }

    /// Adds a nested namespace named after its kind.
    #[must_use]
    pub fn with_namespace(mut self, namespace: Self) -> Self {
        let name = namespace.kind.clone();
        self.members.insert(name, HostValue::object(namespace));
        self
    }
}

impl HostNode for NamespaceNode {
    fn lookup(&self, name: &str) -> Option<HostValue> {
        self.members.get(name).cloned()
    }

    fn identity(&self) -> Option<i64> {
        self.identity
    }

    fn kind(&self) -> String {
        self.kind.clone()
    }
}

type FunctionBody = dyn Fn(&Arguments) -> Result<HostValue, InvocationError>;

/// A callable node with declared parameters.
///
/// Binding follows the usual positional-then-keyword rules: positional
/// arguments fill parameters in order, keywords fill the rest, and surplus
/// positional arguments are only accepted by variadic functions.
pub struct FunctionNode {
    name: String,
    parameters: Vec<String>,
    variadic: bool,
    body: Box<FunctionBody>,
}

impl FunctionNode {
    /// Builds a function from its name, parameters and body.
    pub fn new<F>(name: impl Into<String>, parameters: &[&str], body: F) -> Self
    where
        F: Fn(&Arguments) -> Result<HostValue, InvocationError> + 'static,
    {
        Self {
            name: name.into(),
            parameters: parameters.iter().map(|&name| name.to_owned()).collect(),
            variadic: false,
            body: Box::new(body),
        }
    }

    /// Accepts surplus positional arguments, exposed via [`Arguments::rest`].
    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    fn bind(&self, args: Vec<HostValue>, kwargs: HostKwargs) -> Result<Arguments, InvocationError> {
        let given = args.len();
        let mut positional = args.into_iter();
        let mut values = BTreeMap::new();
        for (parameter, value) in self.parameters.iter().zip(positional.by_ref()) {
            values.insert(parameter.clone(), value);
        }
        let rest: Vec<HostValue> = positional.collect();
        if !rest.is_empty() && !self.variadic {
            return Err(InvocationError::Arity {
                operation: self.name.clone(),
                expected: self.parameters.len(),
                given,
            });
        }
        for (name, value) in kwargs {
            if !self.parameters.contains(&name) {
                return Err(InvocationError::UnexpectedKeyword {
                    operation: self.name.clone(),
                    name,
                });
            }
            if values.contains_key(&name) {
                return Err(InvocationError::DuplicateArgument {
                    operation: self.name.clone(),
                    name,
                });
            }
            values.insert(name, value);
        }
        Ok(Arguments {
            operation: self.name.clone(),
            values,
            rest,
        })
    }
}

impl std::fmt::Debug for FunctionNode {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("FunctionNode")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("variadic", &self.variadic)
            .finish_non_exhaustive()
    }
}

impl HostNode for FunctionNode {
    fn lookup(&self, _name: &str) -> Option<HostValue> {
        None
    }

    fn is_invocable(&self) -> bool {
        true
    }

    fn parameters(&self) -> Vec<String> {
        self.parameters.clone()
    }

    fn invoke(&self, args: Vec<HostValue>, kwargs: HostKwargs) -> Result<HostValue, InvocationError> {
        let arguments = self.bind(args, kwargs)?;
        (self.body)(&arguments).map_err(|error| error.in_frame(&self.name))
    }

    fn kind(&self) -> String {
        "function".to_owned()
    }

    fn describe(&self) -> String {
        format!("<function {}>", self.name)
    }
}

/// Arguments bound to a [`FunctionNode`]'s parameters.
#[derive(Debug)]
pub struct Arguments {
    operation: String,
    values: BTreeMap<String, HostValue>,
    rest: Vec<HostValue>,
}

impl Arguments {
    /// Returns the value bound to `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HostValue> {
        self.values.get(name)
    }

    /// Returns the value bound to `name`.
    ///
    /// # Errors
    ///
    /// Fails with [`InvocationError::MissingArgument`] when unbound.
    pub fn required(&self, name: &str) -> Result<&HostValue, InvocationError> {
        self.get(name).ok_or_else(|| InvocationError::MissingArgument {
            operation: self.operation.clone(),
            name: name.to_owned(),
        })
    }

    /// Returns an integer argument.
    ///
    /// # Errors
    ///
    /// Fails when the argument is missing or not an integer.
    pub fn int(&self, name: &str) -> Result<i64, InvocationError> {
        let value = self.required(name)?;
        value
            .as_i64()
            .ok_or_else(|| self.type_error(name, "int", value))
    }

    /// Returns a numeric argument.
    ///
    /// # Errors
    ///
    /// Fails when the argument is missing or not a number.
    pub fn float(&self, name: &str) -> Result<f64, InvocationError> {
        let value = self.required(name)?;
        value
            .as_f64()
            .ok_or_else(|| self.type_error(name, "float", value))
    }

    /// Returns a text argument.
    ///
    /// # Errors
    ///
    /// Fails when the argument is missing or not text.
    pub fn string(&self, name: &str) -> Result<&str, InvocationError> {
        let value = self.required(name)?;
        value
            .as_str()
            .ok_or_else(|| self.type_error(name, "str", value))
    }

    /// Surplus positional arguments of a variadic function.
    #[must_use]
    pub fn rest(&self) -> &[HostValue] {
        &self.rest
    }

    /// Name of the function being invoked.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Builds an [`InvocationError::ArgumentType`] for `value`.
    #[must_use]
    pub fn type_error(&self, name: &str, expected: &str, value: &HostValue) -> InvocationError {
        InvocationError::argument_type(&self.operation, name, expected, value.type_name())
    }
}

/// Namespace over a fixed root and a static context table.
pub struct StaticNamespace {
    root: Rc<dyn HostNode>,
    contexts: BTreeMap<i64, HostValue>,
}

impl StaticNamespace {
    /// Builds a namespace rooted at `root`.
    pub fn new(root: impl HostNode + 'static) -> Self {
        Self {
            root: Rc::new(root),
            contexts: BTreeMap::new(),
        }
    }

    /// Registers a context object under `id`.
    #[must_use]
    pub fn with_context(mut self, id: i64, value: HostValue) -> Self {
        self.contexts.insert(id, value);
        self
    }
}

impl HostNamespace for StaticNamespace {
    fn root(&self) -> Rc<dyn HostNode> {
        Rc::clone(&self.root)
    }

    fn context_by_id(&self, id: i64) -> Option<HostValue> {
        self.contexts.get(&id).cloned()
    }
}
