// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Drag-to-move through an invisible helper box.
//!
//! The helper sits at the model's bounds center. Dragging moves the helper
//! with its height (Z) locked to the starting value, and the model follows at a fixed
//! offset. Camera controls are off for the duration of a drag.

use crate::camera::Camera;
use crate::error::{Result, ViewerError};
use crate::scene::{ObjectId, Scene};
use bim_showcase_geometry::Aabb;
use nalgebra::{Point3, Vector3};

#[derive(Debug, Clone)]
pub struct DragHelper {
    helper: ObjectId,
    model: ObjectId,
    initial_helper_position: Vector3<f64>,
    /// Model position minus helper position
    offset: Vector3<f64>,
    dragging: bool,
}

impl DragHelper {
    /// Add the helper for a model object; None if the object is gone or empty
    pub fn attach(scene: &mut Scene, model: ObjectId) -> Option<Self> {
        let object = scene.get(model)?;
        let bounds = object.world_bounds();
        if bounds.is_empty() {
            return None;
        }
        let model_position = object.transform.position;

        let center = bounds.center().coords;
        let half = bounds.size() / 2.0;
        let helper = scene.add(
            "drag-helper",
            Aabb::new(Point3::from(-half), Point3::from(half)),
        );
        if let Some(object) = scene.get_mut(helper) {
            object.visible = false;
            object.transform.position = center;
        }

        Some(Self {
            helper,
            model,
            initial_helper_position: center,
            offset: model_position - center,
            dragging: false,
        })
    }

    /// Remove the helper from the scene
    pub fn detach(self, scene: &mut Scene) {
        scene.remove(self.helper);
    }

    pub fn helper(&self) -> ObjectId {
        self.helper
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn start(&mut self, camera: &mut Camera) {
        self.dragging = true;
        camera.set_controls_enabled(false);
    }

    /// Move the helper towards `position`; returns the new model position
    pub fn drag_to(&mut self, scene: &mut Scene, position: Vector3<f64>) -> Result<Vector3<f64>> {
        if !self.dragging {
            return Err(ViewerError::NotDragging);
        }

        let mut helper_position = position;
        helper_position.z = self.initial_helper_position.z;
        let model_position = helper_position + self.offset;

        if let Some(helper) = scene.get_mut(self.helper) {
            helper.transform.position = helper_position;
        }
        let model = scene.get_mut(self.model).ok_or(ViewerError::NoModelLoaded)?;
        model.transform.position = model_position;
        Ok(model_position)
    }

    pub fn end(&mut self, camera: &mut Camera) {
        self.dragging = false;
        camera.set_controls_enabled(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scene_with_door() -> (Scene, ObjectId) {
        let mut scene = Scene::new();
        let id = scene.add(
            "door",
            Aabb::new(Point3::new(2.0, 0.0, 0.0), Point3::new(3.1, 0.07, 2.0)),
        );
        (scene, id)
    }

    #[test]
    fn test_helper_at_bounds_center() {
        let (mut scene, door) = scene_with_door();
        let drag = DragHelper::attach(&mut scene, door).unwrap();

        let helper = scene.get(drag.helper()).unwrap();
        assert!(!helper.visible);
        assert_relative_eq!(helper.transform.position, Vector3::new(2.55, 0.035, 1.0), epsilon = 1e-12);
        assert_relative_eq!(helper.world_bounds().size(), Vector3::new(1.1, 0.07, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn test_drag_moves_model_with_locked_height() {
        let (mut scene, door) = scene_with_door();
        let mut camera = Camera::default();
        let mut drag = DragHelper::attach(&mut scene, door).unwrap();

        drag.start(&mut camera);
        assert!(!camera.controls_enabled());

        let moved = drag
            .drag_to(&mut scene, Vector3::new(5.55, 9.0, 1.5))
            .unwrap();
        // Model starts at the origin, helper at (2.55, 0.035, 1.0)
        assert_relative_eq!(moved, Vector3::new(3.0, 8.965, 0.0), epsilon = 1e-12);
        assert_relative_eq!(
            scene.get(drag.helper()).unwrap().transform.position.z,
            1.0,
            epsilon = 1e-12
        );

        drag.end(&mut camera);
        assert!(camera.controls_enabled());
        assert!(matches!(
            drag.drag_to(&mut scene, Vector3::zeros()),
            Err(ViewerError::NotDragging)
        ));
    }

    #[test]
    fn test_detach_removes_helper() {
        let (mut scene, door) = scene_with_door();
        let drag = DragHelper::attach(&mut scene, door).unwrap();
        assert_eq!(scene.len(), 2);
        drag.detach(&mut scene);
        assert_eq!(scene.len(), 1);
    }
}
