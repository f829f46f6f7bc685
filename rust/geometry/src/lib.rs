// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BIM Showcase Geometry
//!
//! Placement resolution and axis-aligned bounds for IFC products, using
//! nalgebra for transformations and rayon to process elements in parallel.

pub mod aabb;
pub mod bounds;
pub mod error;
pub mod transform;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

pub use aabb::Aabb;
pub use bounds::{
    element_bounds, extract_model_geometry, extract_model_geometry_indexed, item_bounds, ElementBounds,
    ModelGeometry,
};
pub use error::{Error, Result};
pub use transform::{
    frame_matrix, object_placement, parse_axis2_placement_3d, parse_transformation_operator,
    resolve_local_placement,
};
