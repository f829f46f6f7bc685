// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer session: the world, the loaded model and its editing state.
//!
//! Loading is split in two so the slow part (fetch and conversion) can run
//! without holding the session: [`ViewerSession::begin_load`] hands out a
//! ticket, [`ViewerSession::finish_load`] installs the result. Only the
//! ticket of the most recent `begin_load` is honoured; older results are
//! dropped with [`ViewerError::Superseded`].

use crate::dimensions::{
    apply_scale, compute_scale, reset_scale, AxisConvention, Dimensions, ScaleFactors,
};
use crate::drag::DragHelper;
use crate::error::{Result, ViewerError};
use crate::fragments::{ConvertedModel, FragmentsModel, FragmentsModels, SceneRefresh};
use crate::importer::IfcImporter;
use crate::scene::ObjectId;
use crate::selection::Selection;
use crate::source::{model_id, validate_file_name, ModelSource};
use crate::views::{elevations, floor_plans, PlacedStorey, ViewDefinition};
use crate::world::World;
use bim_showcase_core::ElementProperties;
use bim_showcase_geometry::Aabb;
use nalgebra::{Point3, Vector3};
use std::sync::Arc;

/// Proof that a load was started; redeem it with [`ViewerSession::finish_load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    file_name: String,
}

impl LoadTicket {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Summary of a successful load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    pub model_id: String,
    pub object: ObjectId,
    /// World-space bounds right after loading
    pub bounds: Aabb,
    pub original: Dimensions,
    pub element_count: usize,
}

/// Rescale baseline captured at load time
#[derive(Debug)]
struct CurrentModel {
    model: Arc<FragmentsModel>,
    original: Dimensions,
    original_scale: Vector3<f64>,
    target: Dimensions,
}

#[derive(Debug, Default)]
pub struct ViewerSession {
    world: World,
    fragments: FragmentsModels,
    current: Option<CurrentModel>,
    /// File name of the load in flight, if any
    loading: Option<String>,
    generation: u64,
    pending: Option<u64>,
    selection: Selection,
    drag: Option<DragHelper>,
}

impl ViewerSession {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            ..Self::default()
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn fragments(&self) -> &FragmentsModels {
        &self.fragments
    }

    pub fn loading(&self) -> Option<&str> {
        self.loading.as_deref()
    }

    pub fn model(&self) -> Option<&Arc<FragmentsModel>> {
        self.current.as_ref().map(|c| &c.model)
    }

    pub fn model_id(&self) -> Option<&str> {
        self.model().map(|m| m.model_id())
    }

    /// Start loading `file_name`
    ///
    /// Previous models are disposed right away, so a failed load leaves an
    /// empty scene.
    pub fn begin_load(&mut self, file_name: &str) -> Result<LoadTicket> {
        validate_file_name(file_name)?;

        self.generation += 1;
        self.pending = Some(self.generation);
        self.loading = Some(file_name.to_string());

        self.clear_model();
        let disposed = self.fragments.dispose_all(&mut self.world.scene);

        tracing::info!(
            file = file_name,
            generation = self.generation,
            disposed,
            "Loading model"
        );

        Ok(LoadTicket {
            generation: self.generation,
            file_name: file_name.to_string(),
        })
    }

    /// Install the result of the load started with `ticket`
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<ConvertedModel>,
    ) -> Result<LoadedModel> {
        if self.pending != Some(ticket.generation) {
            tracing::warn!(
                file = %ticket.file_name,
                generation = ticket.generation,
                current = self.generation,
                "Discarding superseded load"
            );
            return Err(ViewerError::Superseded {
                file: ticket.file_name,
            });
        }
        self.pending = None;
        self.loading = None;

        let converted = result.map_err(|e| {
            tracing::error!(file = %ticket.file_name, error = %e, "Error loading IFC");
            e
        })?;

        let id = model_id(&ticket.file_name);
        let model = self.fragments.load(&id, converted, &mut self.world.scene);
        self.fragments.update(true);

        let (bounds, original_scale) = match self.world.scene.get(model.object()) {
            Some(object) => (object.world_bounds(), object.transform.scale),
            None => (model.bounds(), Vector3::new(1.0, 1.0, 1.0)),
        };
        let original = AxisConvention::Z_UP
            .dimensions_from_size(&bounds.size())
            .rounded();

        if !bounds.is_empty() {
            self.world.camera.fit_to_bounds(&bounds);
        }
        self.drag = DragHelper::attach(&mut self.world.scene, model.object());

        let loaded = LoadedModel {
            model_id: id,
            object: model.object(),
            bounds,
            original,
            element_count: model.elements().len(),
        };
        self.current = Some(CurrentModel {
            model,
            original,
            original_scale,
            target: original,
        });

        tracing::info!(model_id = %loaded.model_id, dimensions = %original, "Model ready");
        Ok(loaded)
    }

    /// Give up on the load started with `ticket` without installing anything
    ///
    /// Clears the loading state if `ticket` is still the pending one; a
    /// superseded or already finished ticket leaves the session alone.
    pub fn abandon_load(&mut self, ticket: &LoadTicket) -> bool {
        if self.pending != Some(ticket.generation) {
            return false;
        }
        self.pending = None;
        self.loading = None;
        tracing::warn!(
            file = %ticket.file_name,
            generation = ticket.generation,
            "Load abandoned before completion"
        );
        true
    }

    /// Fetch, convert and install in one go
    pub fn load(
        &mut self,
        source: &dyn ModelSource,
        importer: &IfcImporter,
        file_name: &str,
    ) -> Result<LoadedModel> {
        let ticket = self.begin_load(file_name)?;
        let result = source.fetch(file_name).and_then(|bytes| {
            importer.process(&bytes, |percent, stage| {
                tracing::debug!(file = file_name, percent, stage, "Conversion progress");
            })
        });
        self.finish_load(ticket, result)
    }

    fn clear_model(&mut self) {
        if let Some(drag) = self.drag.take() {
            drag.detach(&mut self.world.scene);
        }
        self.world.camera.set_controls_enabled(true);
        self.selection.clear();
        self.current = None;
    }

    fn current(&self) -> Result<&CurrentModel> {
        self.current.as_ref().ok_or(ViewerError::NoModelLoaded)
    }

    pub fn original_dimensions(&self) -> Option<Dimensions> {
        self.current.as_ref().map(|c| c.original)
    }

    pub fn original_scale(&self) -> Option<Vector3<f64>> {
        self.current.as_ref().map(|c| c.original_scale)
    }

    pub fn target_dimensions(&self) -> Option<Dimensions> {
        self.current.as_ref().map(|c| c.target)
    }

    pub fn set_target_dimensions(&mut self, target: Dimensions) -> Result<()> {
        let current = self.current.as_mut().ok_or(ViewerError::NoModelLoaded)?;
        current.target = target;
        Ok(())
    }

    /// Rescale the model so its bounds match the target dimensions
    pub fn apply_dimensions(&mut self) -> Result<ScaleFactors> {
        let current = self.current()?;
        let factors = compute_scale(&current.target, &current.original)?;
        let original_scale = current.original_scale;
        let object = current.model.object();

        let transform = &mut self
            .world
            .scene
            .get_mut(object)
            .ok_or(ViewerError::NoModelLoaded)?
            .transform;
        apply_scale(transform, &original_scale, &factors, &mut self.fragments);

        tracing::info!(
            x = factors.x,
            y = factors.y,
            z = factors.z,
            "Dimensions applied"
        );
        Ok(factors)
    }

    /// Restore load-time scale and target
    pub fn reset_dimensions(&mut self) -> Result<Dimensions> {
        let current = self.current.as_mut().ok_or(ViewerError::NoModelLoaded)?;
        current.target = current.original;
        let original = current.original;
        let original_scale = current.original_scale;
        let object = current.model.object();

        let transform = &mut self
            .world
            .scene
            .get_mut(object)
            .ok_or(ViewerError::NoModelLoaded)?
            .transform;
        reset_scale(transform, &original_scale, &mut self.fragments);

        tracing::info!(dimensions = %original, "Dimensions reset");
        Ok(original)
    }

    /// Current scale of the model object
    pub fn model_scale(&self) -> Option<Vector3<f64>> {
        let object = self.current.as_ref()?.model.object();
        self.world.scene.get(object).map(|o| o.transform.scale)
    }

    /// Current position of the model object
    pub fn model_position(&self) -> Option<Vector3<f64>> {
        let object = self.current.as_ref()?.model.object();
        self.world.scene.get(object).map(|o| o.transform.position)
    }

    /// World bounds of the model as it stands now (after rescale or drag)
    pub fn model_bounds(&self) -> Option<Aabb> {
        let object = self.current.as_ref()?.model.object();
        self.world.scene.get(object).map(|o| o.world_bounds())
    }

    /// "Loaded: <id> | W: 1.10m × H: 2.00m × D: 0.07m"
    pub fn status_line(&self) -> Option<String> {
        let current = self.current.as_ref()?;
        Some(format!("Loaded: {} | {}", current.model.model_id(), current.target))
    }

    pub fn start_drag(&mut self) -> Result<()> {
        let drag = self.drag.as_mut().ok_or(ViewerError::NoModelLoaded)?;
        drag.start(&mut self.world.camera);
        Ok(())
    }

    pub fn drag_to(&mut self, position: Vector3<f64>) -> Result<Vector3<f64>> {
        let drag = self.drag.as_mut().ok_or(ViewerError::NoModelLoaded)?;
        drag.drag_to(&mut self.world.scene, position)
    }

    pub fn end_drag(&mut self) -> Result<()> {
        let drag = self.drag.as_mut().ok_or(ViewerError::NoModelLoaded)?;
        drag.end(&mut self.world.camera);
        Ok(())
    }

    /// Floor plans and elevations of the model as currently placed
    pub fn views(&self) -> Result<Vec<ViewDefinition>> {
        let current = self.current()?;
        let object = self
            .world
            .scene
            .get(current.model.object())
            .ok_or(ViewerError::NoModelLoaded)?;
        let bounds = object.world_bounds();
        let matrix = object.transform.matrix();
        let unit_scale = current.model.unit_scale();

        let storeys: Vec<PlacedStorey> = current
            .model
            .storeys()
            .into_iter()
            .map(|storey| PlacedStorey {
                id: storey.id,
                elevation: matrix
                    .transform_point(&Point3::new(0.0, 0.0, storey.elevation * unit_scale))
                    .z,
                name: storey.name,
            })
            .collect();

        let mut views = floor_plans(&storeys, &bounds);
        views.extend(elevations(&bounds));
        Ok(views)
    }

    /// Select an element of the loaded model and return its property table
    pub fn select(&mut self, express_id: u32) -> Result<ElementProperties> {
        let properties = self.current()?.model.element_properties(express_id)?;
        self.selection.select(properties.clone());
        Ok(properties)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn set_lighting(&mut self, directional: Option<f64>, ambient: Option<f64>) {
        let lighting = &mut self.world.lighting;
        if let Some(intensity) = directional {
            lighting.set_directional(intensity);
        }
        if let Some(intensity) = ambient {
            lighting.set_ambient(intensity);
        }
        tracing::debug!(
            directional = lighting.directional(),
            ambient = lighting.ambient(),
            "Lighting updated"
        );
    }
}
