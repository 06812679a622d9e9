//! Live handles onto studio documents.

use std::cell::RefCell;
use std::rc::Rc;

use crate::host::{HostNode, HostValue};

use super::state::StudioState;

pub(crate) type SharedState = Rc<RefCell<StudioState>>;

pub(crate) const IMAGE_KIND: &str = "Image";
pub(crate) const LAYER_KIND: &str = "Layer";

pub(crate) fn image_value(state: &SharedState, id: i64) -> HostValue {
    HostValue::object(ImageNode {
        id,
        state: Rc::clone(state),
    })
}

pub(crate) fn layer_value(state: &SharedState, id: i64) -> HostValue {
    HostValue::object(LayerNode {
        id,
        state: Rc::clone(state),
    })
}

/// An open image.
struct ImageNode {
    id: i64,
    state: SharedState,
}

impl HostNode for ImageNode {
    fn lookup(&self, name: &str) -> Option<HostValue> {
        let state = self.state.borrow();
        let record = state.image(self.id).ok()?;
        match name {
            "name" => Some(HostValue::from(record.name.as_str())),
            "width" => Some(HostValue::Int(record.width)),
            "height" => Some(HostValue::Int(record.height)),
            _ => None,
        }
    }

    fn identity(&self) -> Option<i64> {
        Some(self.id)
    }

    fn kind(&self) -> String {
        IMAGE_KIND.to_owned()
    }

    fn describe(&self) -> String {
        match self.state.borrow().image(self.id) {
            Ok(record) => format!("<Image '{}' ({})>", record.name, self.id),
            Err(_) => format!("<Image ({}) closed>", self.id),
        }
    }
}

/// A layer inside an image.
struct LayerNode {
    id: i64,
    state: SharedState,
}

impl HostNode for LayerNode {
    fn lookup(&self, name: &str) -> Option<HostValue> {
        let state = self.state.borrow();
        let record = state.layer(self.id).ok()?;
        match name {
            "name" => Some(HostValue::from(record.name.as_str())),
            "image" => Some(HostValue::Int(record.image)),
            _ => None,
        }
    }

    fn identity(&self) -> Option<i64> {
        Some(self.id)
    }

    fn kind(&self) -> String {
        LAYER_KIND.to_owned()
    }
}
