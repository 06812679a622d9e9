//! In-process demo host: a small image editor exposed through the host
//! capability interface.
//!
//! The studio stands in for a real image application when running `easeld`
//! on its own. Its root namespace mirrors the layout the controller tools
//! expect: `get_images`, `displays_flush`, the `Image` and `Layer`
//! namespaces, and `Pdb.run_procedure` for filters.

mod api;
mod nodes;
mod state;

use std::cell::RefCell;
use std::rc::Rc;

use crate::host::{HostNamespace, HostNode, HostValue};

pub use self::api::GAUSSIAN_BLUR;
use self::nodes::{SharedState, image_value, layer_value};
use self::state::StudioState;

/// Document store and root namespace of the demo host.
pub struct Studio {
    root: Rc<dyn HostNode>,
    state: SharedState,
}

impl Studio {
    /// Creates an empty studio whose root namespace is named `root_name`.
    #[must_use]
    pub fn new(root_name: &str) -> Self {
        let state: SharedState = Rc::new(RefCell::new(StudioState::default()));
        let root: Rc<dyn HostNode> = Rc::new(api::build_root(root_name, &state));
        Self { root, state }
    }

    /// Creates a studio holding a single blank image.
    #[must_use]
    pub fn with_sample_image(root_name: &str) -> Self {
        let studio = Self::new(root_name);
        studio.create_image("Untitled", 640, 480);
        studio
    }

    /// Opens a new image and returns its id.
    pub fn create_image(&self, name: &str, width: i64, height: i64) -> i64 {
        self.state.borrow_mut().create_image(name, width, height)
    }

    /// Ids of every open image.
    #[must_use]
    pub fn image_ids(&self) -> Vec<i64> {
        self.state.borrow().image_ids()
    }

    /// Layer ids of `image`, empty when the image is unknown.
    #[must_use]
    pub fn layer_ids(&self, image: i64) -> Vec<i64> {
        self.state
            .borrow()
            .image(image)
            .map(|record| record.layers.clone())
            .unwrap_or_default()
    }

    /// Blur radii applied to `layer`, oldest first.
    #[must_use]
    pub fn blur_radii(&self, layer: i64) -> Vec<f64> {
        self.state
            .borrow()
            .layer(layer)
            .map(|record| record.blur_radii.clone())
            .unwrap_or_default()
    }

    /// Number of display flushes requested so far.
    #[must_use]
    pub fn flush_count(&self) -> u64 {
        self.state.borrow().flushes()
    }
}

impl HostNamespace for Studio {
    fn root(&self) -> Rc<dyn HostNode> {
        Rc::clone(&self.root)
    }

    fn context_by_id(&self, id: i64) -> Option<HostValue> {
        let state = self.state.borrow();
        if state.has_image(id) {
            Some(image_value(&self.state, id))
        } else if state.has_layer(id) {
            Some(layer_value(&self.state, id))
        } else {
            None
        }
    }
}
