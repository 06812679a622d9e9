//! Typed controller tools built on [`ConnectionManager::call`].
//!
//! Each tool is one bridge call or a short sequence of them. A failing step
//! ends the sequence and its error is returned; no partial result is built.

use easel_proto::{CONTEXT_HANDLE_KEY, CallParams, Kwargs, WireValue};
use serde_json::{Value, json};
use thiserror::Error;

use crate::connection::{CallError, ConnectionManager};

/// Procedure name of the host's Gaussian blur filter.
pub const GAUSSIAN_BLUR_PROCEDURE: &str = "plug-in-gauss";

/// Radius used by `blur` when none is given.
pub const DEFAULT_BLUR_RADIUS: f64 = 5.0;

/// Errors reported by the typed tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A bridge call failed.
    #[error(transparent)]
    Call(#[from] CallError),
    /// The image has no active layer to filter.
    #[error("image {image_id} has no active layer")]
    NoActiveLayer {
        /// Image that was queried.
        image_id: i64,
    },
    /// A call returned a value of the wrong shape.
    #[error("unexpected result from {operation}: {value}")]
    UnexpectedResult {
        /// Operation path that produced the value.
        operation: String,
        /// Value received.
        value: WireValue,
    },
}

impl ToolError {
    /// Host-side traceback carried by a remote failure.
    #[must_use]
    pub fn traceback(&self) -> Option<&str> {
        match self {
            Self::Call(error) => error.traceback(),
            _ => None,
        }
    }
}

/// Typed wrappers over the bridge anchored at one root namespace.
pub struct Tools<'a> {
    connection: &'a mut ConnectionManager,
    root: String,
}

impl<'a> Tools<'a> {
    /// Wraps `connection`; operation paths are anchored at `root`.
    pub fn new(connection: &'a mut ConnectionManager, root: impl Into<String>) -> Self {
        Self {
            connection,
            root: root.into(),
        }
    }

    fn path(&self, suffix: &str) -> String {
        format!("{}.{suffix}", self.root)
    }

    fn call(&mut self, params: CallParams) -> Result<WireValue, ToolError> {
        Ok(self.connection.call(params)?)
    }

    fn image_query(&mut self, image_id: i64, suffix: &str) -> Result<WireValue, ToolError> {
        let params = CallParams::new(self.path(suffix)).with_kwarg(CONTEXT_HANDLE_KEY, image_id);
        self.call(params)
    }

    /// Calls an arbitrary operation path with the given arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Call`] when the bridge call fails.
    pub fn call_api(
        &mut self,
        path: &str,
        args: Vec<Value>,
        kwargs: Kwargs,
    ) -> Result<Value, ToolError> {
        let params = CallParams {
            operation_path: path.to_owned(),
            args,
            kwargs,
        };
        Ok(self.call(params)?.to_json())
    }

    /// Lists the open images as handles.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Call`] when the bridge call fails.
    pub fn get_images(&mut self) -> Result<Value, ToolError> {
        let params = CallParams::new(self.path("get_images"));
        Ok(self.call(params)?.to_json())
    }

    /// Gathers the name, size and layers of one image.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when any of the underlying calls fails.
    pub fn get_image_info(&mut self, image_id: i64) -> Result<Value, ToolError> {
        let lookup = CallParams::new(self.path("Image.get_by_id")).with_arg(image_id);
        self.call(lookup)?;
        let name = self.image_query(image_id, "Image.get_name")?;
        let width = self.image_query(image_id, "Image.get_width")?;
        let height = self.image_query(image_id, "Image.get_height")?;
        let layers = self.image_query(image_id, "Image.get_layers")?;
        Ok(json!({
            "id": image_id,
            "name": name.to_json(),
            "width": width.to_json(),
            "height": height.to_json(),
            "layers": layers.to_json(),
        }))
    }

    /// Blurs the active layer of an image and refreshes the displays.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::NoActiveLayer`] when the image has no active
    /// layer, and [`ToolError::Call`] when a bridge call fails.
    pub fn apply_gaussian_blur(&mut self, image_id: i64, radius: f64) -> Result<Value, ToolError> {
        let operation = self.path("Image.get_active_layer");
        let layer = match self.image_query(image_id, "Image.get_active_layer")? {
            WireValue::Null => return Err(ToolError::NoActiveLayer { image_id }),
            value => value.handle_id().ok_or(ToolError::UnexpectedResult { operation, value })?,
        };
        let blur = CallParams::new(self.path("Pdb.run_procedure"))
            .with_arg(GAUSSIAN_BLUR_PROCEDURE)
            .with_arg(image_id)
            .with_arg(layer)
            .with_arg(radius)
            .with_arg(radius)
            .with_arg(0);
        let result = self.call(blur)?;
        self.call(CallParams::new(self.path("displays_flush")))?;
        Ok(json!({
            "image_id": image_id,
            "layer_id": layer,
            "radius": radius,
            "result": result.to_json(),
        }))
    }
}
