//! Mutable document state behind the demo host.

use std::collections::BTreeMap;

use crate::host::InvocationError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ImageRecord {
    pub(crate) name: String,
    pub(crate) width: i64,
    pub(crate) height: i64,
    pub(crate) layers: Vec<i64>,
    pub(crate) active_layer: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LayerRecord {
    pub(crate) image: i64,
    pub(crate) name: String,
    pub(crate) blur_radii: Vec<f64>,
}

/// Images and layers share one id space.
#[derive(Debug, Default)]
pub(crate) struct StudioState {
    next_id: i64,
    images: BTreeMap<i64, ImageRecord>,
    layers: BTreeMap<i64, LayerRecord>,
    flushes: u64,
}

impl StudioState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn create_image(&mut self, name: &str, width: i64, height: i64) -> i64 {
        let image = self.allocate_id();
        let layer = self.allocate_id();
        self.layers.insert(
            layer,
            LayerRecord {
                image,
                name: "Background".to_owned(),
                blur_radii: Vec::new(),
            },
        );
        self.images.insert(
            image,
            ImageRecord {
                name: name.to_owned(),
                width,
                height,
                layers: vec![layer],
                active_layer: Some(layer),
            },
        );
        image
    }

    pub(crate) fn image_ids(&self) -> Vec<i64> {
        self.images.keys().copied().collect()
    }

    pub(crate) fn image(&self, id: i64) -> Result<&ImageRecord, InvocationError> {
        self.images
            .get(&id)
            .ok_or_else(|| InvocationError::host(format!("no image with id {id}")))
    }

    pub(crate) fn layer(&self, id: i64) -> Result<&LayerRecord, InvocationError> {
        self.layers
            .get(&id)
            .ok_or_else(|| InvocationError::host(format!("no layer with id {id}")))
    }

    pub(crate) fn has_image(&self, id: i64) -> bool {
        self.images.contains_key(&id)
    }

    pub(crate) fn has_layer(&self, id: i64) -> bool {
        self.layers.contains_key(&id)
    }

    pub(crate) fn blur_layer(&mut self, image: i64, layer: i64, radius: f64) -> Result<(), InvocationError> {
        self.image(image)?;
        let record = self
            .layers
            .get_mut(&layer)
            .ok_or_else(|| InvocationError::host(format!("no layer with id {layer}")))?;
        if record.image != image {
            return Err(InvocationError::host(format!(
                "layer {layer} does not belong to image {image}"
            )));
        }
        record.blur_radii.push(radius);
        Ok(())
    }

    pub(crate) fn flush(&mut self) {
        self.flushes += 1;
    }

    pub(crate) const fn flushes(&self) -> u64 {
        self.flushes
    }
}
