// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fragments models: converted IFC models placed in the scene
//!
//! A [`ConvertedModel`] is what the importer produces; loading it into the
//! [`FragmentsModels`] registry gives it a model id and a scene object.

use crate::error::{Result, ViewerError};
use crate::scene::{ObjectId, Scene};
use bim_showcase_core::{
    ElementProperties, EntityDecoder, EntityIndex, PropertyIndex, SpatialStructure, Storey,
};
use bim_showcase_geometry::{Aabb, ElementBounds, ModelGeometry};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Receives refresh requests after the scene changed
pub trait SceneRefresh {
    fn update(&mut self, force: bool);
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConversionStats {
    pub byte_size: usize,
    pub entity_count: usize,
    pub element_count: usize,
    pub skipped_elements: usize,
    pub property_definitions: usize,
    pub convert_time_ms: u64,
}

/// Output of the IFC importer, ready to load
#[derive(Debug)]
pub struct ConvertedModel {
    pub(crate) content: Arc<str>,
    pub(crate) entity_index: Arc<EntityIndex>,
    pub(crate) geometry: ModelGeometry,
    pub(crate) properties: PropertyIndex,
    pub(crate) spatial: SpatialStructure,
    pub(crate) stats: ConversionStats,
}

impl ConvertedModel {
    pub fn bounds(&self) -> Aabb {
        self.geometry.bounds
    }

    pub fn stats(&self) -> &ConversionStats {
        &self.stats
    }
}

/// A model loaded into the registry
#[derive(Debug)]
pub struct FragmentsModel {
    model_id: String,
    object: ObjectId,
    data: ConvertedModel,
}

impl FragmentsModel {
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    /// Model bounds in model space, metres
    pub fn bounds(&self) -> Aabb {
        self.data.geometry.bounds
    }

    pub fn unit_scale(&self) -> f64 {
        self.data.geometry.unit_scale
    }

    pub fn elements(&self) -> &[ElementBounds] {
        &self.data.geometry.elements
    }

    pub fn stats(&self) -> &ConversionStats {
        &self.data.stats
    }

    pub fn spatial(&self) -> &SpatialStructure {
        &self.data.spatial
    }

    pub fn storeys(&self) -> Vec<Storey> {
        self.data.spatial.storeys()
    }

    /// Property view of one element, decoded on demand
    pub fn element_properties(&self, express_id: u32) -> Result<ElementProperties> {
        if !self.data.entity_index.contains_key(&express_id) {
            return Err(ViewerError::UnknownElement(express_id));
        }
        let mut decoder =
            EntityDecoder::with_arc_index(&self.data.content, Arc::clone(&self.data.entity_index));
        Ok(self.data.properties.element_properties(&mut decoder, express_id)?)
    }
}

/// Registry of loaded models keyed by model id
#[derive(Debug, Default)]
pub struct FragmentsModels {
    models: FxHashMap<String, Arc<FragmentsModel>>,
    updates: u64,
}

impl FragmentsModels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converted model and add its object to the scene
    ///
    /// A model already loaded under the same id is disposed first.
    pub fn load(
        &mut self,
        model_id: &str,
        data: ConvertedModel,
        scene: &mut Scene,
    ) -> Arc<FragmentsModel> {
        self.dispose_model(model_id, scene);

        let object = scene.add(model_id, data.geometry.bounds);
        let model = Arc::new(FragmentsModel {
            model_id: model_id.to_string(),
            object,
            data,
        });
        self.models.insert(model_id.to_string(), Arc::clone(&model));

        tracing::info!(
            model_id,
            object = %object,
            elements = model.elements().len(),
            "Fragments model loaded"
        );
        model
    }

    /// Remove a model and its scene object; false when the id is unknown
    pub fn dispose_model(&mut self, model_id: &str, scene: &mut Scene) -> bool {
        match self.models.remove(model_id) {
            Some(model) => {
                scene.remove(model.object);
                tracing::debug!(model_id, "Fragments model disposed");
                true
            }
            None => false,
        }
    }

    /// Dispose every model, returning how many were removed
    pub fn dispose_all(&mut self, scene: &mut Scene) -> usize {
        let ids: Vec<String> = self.models.keys().cloned().collect();
        ids.iter()
            .filter(|id| self.dispose_model(id, scene))
            .count()
    }

    pub fn get(&self, model_id: &str) -> Option<&Arc<FragmentsModel>> {
        self.models.get(model_id)
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.models.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Number of refresh passes requested so far
    pub fn update_count(&self) -> u64 {
        self.updates
    }
}

impl SceneRefresh for FragmentsModels {
    fn update(&mut self, force: bool) {
        self.updates += 1;
        tracing::trace!(
            force,
            updates = self.updates,
            models = self.models.len(),
            "Fragments update"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::IfcImporter;

    const DOOR: &str = include_str!("../../../tests/models/door_1100x2000.ifc");
    const WINDOW: &str = include_str!("../../../tests/models/window_1400x1200.ifc");

    fn convert(content: &str) -> ConvertedModel {
        IfcImporter::new().process(content.as_bytes(), |_, _| {}).unwrap()
    }

    #[test]
    fn test_load_and_dispose() {
        let mut scene = Scene::new();
        let mut models = FragmentsModels::new();

        let door = models.load("door", convert(DOOR), &mut scene);
        let window = models.load("window", convert(WINDOW), &mut scene);
        assert_eq!(models.ids(), vec!["door", "window"]);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.get(door.object()).unwrap().name, "door");

        assert!(models.dispose_model("door", &mut scene));
        assert!(!models.dispose_model("door", &mut scene));
        assert!(scene.get(door.object()).is_none());

        assert_eq!(models.dispose_all(&mut scene), 1);
        assert!(models.is_empty());
        assert!(scene.get(window.object()).is_none());
    }

    #[test]
    fn test_reload_same_id_replaces_object() {
        let mut scene = Scene::new();
        let mut models = FragmentsModels::new();

        let first = models.load("door", convert(DOOR), &mut scene);
        let second = models.load("door", convert(DOOR), &mut scene);
        assert_ne!(first.object(), second.object());
        assert_eq!(scene.len(), 1);
        assert_eq!(models.len(), 1);
    }

    #[test]
    fn test_element_properties() {
        let mut scene = Scene::new();
        let mut models = FragmentsModels::new();
        let door = models.load("door", convert(DOOR), &mut scene);

        let properties = door.element_properties(100).unwrap();
        assert_eq!(properties.tag.as_deref(), Some("D-01"));
        assert_eq!(properties.groups.len(), 2);

        assert!(matches!(door.element_properties(9999), Err(ViewerError::UnknownElement(9999))));
    }

    #[test]
    fn test_update_counts_refreshes() {
        let mut models = FragmentsModels::new();
        models.update(true);
        models.update(false);
        assert_eq!(models.update_count(), 2);
    }
}
