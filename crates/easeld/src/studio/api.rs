//! Callable surface of the demo host.

use crate::host::{Arguments, FunctionNode, HostValue, InvocationError, NamespaceNode};

use super::nodes::{IMAGE_KIND, LAYER_KIND, SharedState, image_value, layer_value};

/// Procedure name of the Gaussian blur filter.
pub const GAUSSIAN_BLUR: &str = "plug-in-gauss";

const DEFAULT_IMAGE_NAME: &str = "Untitled";

pub(crate) fn build_root(root_name: &str, state: &SharedState) -> NamespaceNode {
    NamespaceNode::new(root_name)
        .with_function(get_images(state))
        .with_function(displays_flush(state))
        .with_namespace(image_namespace(state))
        .with_namespace(layer_namespace(state))
        .with_namespace(pdb_namespace(state))
}

fn get_images(state: &SharedState) -> FunctionNode {
    let state = SharedState::clone(state);
    FunctionNode::new("get_images", &[], move |_| {
        let ids = state.borrow().image_ids();
        Ok(HostValue::List(
            ids.into_iter().map(|id| image_value(&state, id)).collect(),
        ))
    })
}

fn displays_flush(state: &SharedState) -> FunctionNode {
    let state = SharedState::clone(state);
    FunctionNode::new("displays_flush", &[], move |_| {
        state.borrow_mut().flush();
        Ok(HostValue::Null)
    })
}

fn image_namespace(state: &SharedState) -> NamespaceNode {
    NamespaceNode::new(IMAGE_KIND)
        .with_function(new_image(state))
        .with_function(image_query(state, "get_by_id", &["id"], |state, arguments| {
            let id = arguments.int("id")?;
            state.borrow().image(id)?;
            Ok(image_value(state, id))
        }))
        .with_function(image_query(state, "get_name", &["image"], |state, arguments| {
            let id = entity_id(arguments, "image", IMAGE_KIND)?;
            Ok(HostValue::from(state.borrow().image(id)?.name.as_str()))
        }))
        .with_function(image_query(state, "get_width", &["image"], |state, arguments| {
            let id = entity_id(arguments, "image", IMAGE_KIND)?;
            Ok(HostValue::Int(state.borrow().image(id)?.width))
        }))
        .with_function(image_query(state, "get_height", &["image"], |state, arguments| {
            let id = entity_id(arguments, "image", IMAGE_KIND)?;
            Ok(HostValue::Int(state.borrow().image(id)?.height))
        }))
        .with_function(image_query(state, "get_layers", &["image"], |state, arguments| {
            let id = entity_id(arguments, "image", IMAGE_KIND)?;
            let layers = state.borrow().image(id)?.layers.clone();
            Ok(HostValue::List(
                layers.into_iter().map(|layer| layer_value(state, layer)).collect(),
            ))
        }))
        .with_function(image_query(
            state,
            "get_active_layer",
            &["image"],
            |state, arguments| {
                let id = entity_id(arguments, "image", IMAGE_KIND)?;
                let active = state.borrow().image(id)?.active_layer;
                Ok(active.map_or(HostValue::Null, |layer| layer_value(state, layer)))
            },
        ))
}

fn new_image(state: &SharedState) -> FunctionNode {
    let state = SharedState::clone(state);
    FunctionNode::new("new", &["width", "height", "name"], move |arguments| {
        let width = arguments.int("width")?;
        let height = arguments.int("height")?;
        let name = match arguments.get("name") {
            Some(value) => value
                .as_str()
                .ok_or_else(|| arguments.type_error("name", "str", value))?,
            None => DEFAULT_IMAGE_NAME,
        };
        if width <= 0 || height <= 0 {
            return Err(InvocationError::host(format!(
                "image dimensions must be positive, got {width}x{height}"
            )));
        }
        let id = state.borrow_mut().create_image(name, width, height);
        Ok(image_value(&state, id))
    })
}

fn layer_namespace(state: &SharedState) -> NamespaceNode {
    NamespaceNode::new(LAYER_KIND)
        .with_function(image_query(state, "get_name", &["layer"], |state, arguments| {
            let id = entity_id(arguments, "layer", LAYER_KIND)?;
            Ok(HostValue::from(state.borrow().layer(id)?.name.as_str()))
        }))
        .with_function(image_query(
            state,
            "get_blur_radii",
            &["layer"],
            |state, arguments| {
                let id = entity_id(arguments, "layer", LAYER_KIND)?;
                let radii = state.borrow().layer(id)?.blur_radii.clone();
                Ok(HostValue::List(radii.into_iter().map(HostValue::Float).collect()))
            },
        ))
}

fn pdb_namespace(state: &SharedState) -> NamespaceNode {
    let state = SharedState::clone(state);
    let run_procedure = FunctionNode::new("run_procedure", &["procedure"], move |arguments| {
        match arguments.string("procedure")? {
            GAUSSIAN_BLUR => {
                gaussian_blur(&state, arguments).map_err(|error| error.in_frame(GAUSSIAN_BLUR))
            }
            other => Err(InvocationError::host(format!("procedure '{other}' not found"))),
        }
    })
    .variadic();
    NamespaceNode::new("Pdb").with_function(run_procedure)
}

/// `plug-in-gauss image drawable horizontal vertical method`
fn gaussian_blur(state: &SharedState, arguments: &Arguments) -> Result<HostValue, InvocationError> {
    let [image, drawable, horizontal, vertical, method] = arguments.rest() else {
        return Err(InvocationError::host(format!(
            "{GAUSSIAN_BLUR} expects (image, drawable, horizontal, vertical, method), got {} arguments",
            arguments.rest().len()
        )));
    };
    let image = value_id(arguments, "image", IMAGE_KIND, image)?;
    let drawable = value_id(arguments, "drawable", LAYER_KIND, drawable)?;
    let horizontal = radius(arguments, "horizontal", horizontal)?;
    radius(arguments, "vertical", vertical)?;
    match method.as_i64() {
        Some(0 | 1) => {}
        _ => return Err(arguments.type_error("method", "0 or 1", method)),
    }
    state.borrow_mut().blur_layer(image, drawable, horizontal)?;
    Ok(HostValue::List(vec![HostValue::from("success")]))
}

fn radius(arguments: &Arguments, name: &str, value: &HostValue) -> Result<f64, InvocationError> {
    match value.as_f64() {
        Some(radius) if radius >= 0.0 => Ok(radius),
        _ => Err(arguments.type_error(name, "a non-negative number", value)),
    }
}

fn entity_id(arguments: &Arguments, name: &str, kind: &str) -> Result<i64, InvocationError> {
    value_id(arguments, name, kind, arguments.required(name)?)
}

/// Accepts either a live object of `kind` or its integer id.
fn value_id(
    arguments: &Arguments,
    name: &str,
    kind: &str,
    value: &HostValue,
) -> Result<i64, InvocationError> {
    match value {
        HostValue::Int(id) => Ok(*id),
        HostValue::Object(node) if node.kind() == kind => node
            .identity()
            .ok_or_else(|| arguments.type_error(name, kind, value)),
        other => Err(arguments.type_error(name, kind, other)),
    }
}

fn image_query<F>(
    state: &SharedState,
    name: &str,
    parameters: &[&str],
    query: F,
) -> FunctionNode
where
    F: Fn(&SharedState, &Arguments) -> Result<HostValue, InvocationError> + 'static,
{
    let state = SharedState::clone(state);
    FunctionNode::new(name, parameters, move |arguments| query(&state, arguments))
}
