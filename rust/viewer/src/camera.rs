// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Orbit camera state.

use bim_showcase_geometry::Aabb;
use nalgebra::{Point3, Vector3};

/// Distance multiplier applied to the largest model dimension when fitting
pub const FIT_DISTANCE_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f64>,
    pub target: Point3<f64>,
    controls_enabled: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Point3::new(5.0, 5.0, 5.0),
            target: Point3::origin(),
            controls_enabled: true,
        }
    }
}

impl Camera {
    pub fn set_look_at(&mut self, position: Point3<f64>, target: Point3<f64>) {
        self.position = position;
        self.target = target;
    }

    /// Look at the box center from the (+, +, +) diagonal
    pub fn fit_to_bounds(&mut self, bounds: &Aabb) {
        let center = bounds.center();
        let distance = bounds.max_dimension() * FIT_DISTANCE_FACTOR;
        self.set_look_at(center + Vector3::repeat(distance), center);
        tracing::debug!(
            distance,
            cx = center.x,
            cy = center.y,
            cz = center.z,
            "Camera fitted to bounds"
        );
    }

    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    pub fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls_enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_to_bounds() {
        let mut camera = Camera::default();
        let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.1, 2.0));
        camera.fit_to_bounds(&bounds);

        assert_relative_eq!(camera.target, Point3::new(0.5, 0.05, 1.0), epsilon = 1e-12);
        assert_relative_eq!(camera.position, Point3::new(3.5, 3.05, 4.0), epsilon = 1e-12);
    }
}
