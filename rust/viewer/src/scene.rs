// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene graph: flat set of objects with a transform and local bounds.

use bim_showcase_geometry::Aabb;
use nalgebra::{Matrix4, UnitQuaternion, Vector3};
use rustc_hash::FxHashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj-{}", self.0)
    }
}

/// Position, rotation and per-axis scale, composed as T * R * S
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub scale: Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub transform: Transform,
    /// Bounds before the object's transform is applied
    pub local_bounds: Aabb,
    pub visible: bool,
}

impl SceneObject {
    /// Bounds of the transformed object in world space
    pub fn world_bounds(&self) -> Aabb {
        self.local_bounds.transformed(&self.transform.matrix())
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    objects: FxHashMap<ObjectId, SceneObject>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, local_bounds: Aabb) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        self.objects.insert(
            id,
            SceneObject {
                id,
                name: name.into(),
                transform: Transform::default(),
                local_bounds,
                visible: true,
            },
        );
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        self.objects.remove(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_world_bounds_follow_transform() {
        let mut scene = Scene::new();
        let id = scene.add(
            "door",
            Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.1, 2.0)),
        );

        let object = scene.get_mut(id).unwrap();
        object.transform.scale = Vector3::new(2.0, 1.0, 1.0);
        object.transform.position = Vector3::new(0.0, 0.0, 1.0);

        let bounds = scene.get(id).unwrap().world_bounds();
        assert_relative_eq!(bounds.size(), Vector3::new(2.0, 0.1, 2.0), epsilon = 1e-12);
        assert_relative_eq!(bounds.min.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_add_and_remove() {
        let mut scene = Scene::new();
        let a = scene.add("a", Aabb::empty());
        let b = scene.add("b", Aabb::empty());
        assert_ne!(a, b);
        assert_eq!(scene.len(), 2);

        assert_eq!(scene.remove(a).unwrap().name, "a");
        assert!(scene.get(a).is_none());
        assert_eq!(scene.len(), 1);
    }
}
