// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! World: scene, camera, grid and lights bundled together.

use crate::camera::Camera;
use crate::scene::Scene;
use nalgebra::Point3;

/// Ground grid drawn on the XY plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    /// Spacing of the fine lines, metres
    pub primary_size: f64,
    /// Spacing of the coarse lines, metres
    pub secondary_size: f64,
    /// Fade-out distance, metres
    pub distance: f64,
    pub visible: bool,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            primary_size: 1.0,
            secondary_size: 10.0,
            distance: 500.0,
            visible: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    directional: f64,
    ambient: f64,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            directional: 1.5,
            ambient: 1.0,
        }
    }
}

impl Lighting {
    pub fn directional(&self) -> f64 {
        self.directional
    }

    pub fn ambient(&self) -> f64 {
        self.ambient
    }

    pub fn set_directional(&mut self, intensity: f64) {
        self.directional = clamp_intensity(intensity);
    }

    pub fn set_ambient(&mut self, intensity: f64) {
        self.ambient = clamp_intensity(intensity);
    }
}

/// Intensities are non-negative; NaN reads as zero
fn clamp_intensity(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

#[derive(Debug, Default)]
pub struct World {
    pub scene: Scene,
    pub camera: Camera,
    pub grid: Grid,
    pub lighting: Lighting,
}

impl World {
    /// Fresh world with the camera at (5, 5, 5) looking at the origin
    pub fn new() -> Self {
        let mut world = World::default();
        world
            .camera
            .set_look_at(Point3::new(5.0, 5.0, 5.0), Point3::origin());
        tracing::debug!("World created");
        world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_view() {
        let world = World::new();
        assert_eq!(world.camera.position, Point3::new(5.0, 5.0, 5.0));
        assert_eq!(world.camera.target, Point3::origin());
        assert!(world.camera.controls_enabled());
        assert!(world.scene.is_empty());
        assert!(world.grid.visible);
    }

    #[test]
    fn test_light_intensity_clamped() {
        let mut lighting = Lighting::default();
        lighting.set_directional(-2.0);
        lighting.set_ambient(f64::NAN);
        assert_eq!(lighting.directional(), 0.0);
        assert_eq!(lighting.ambient(), 0.0);

        lighting.set_directional(3.0);
        assert_eq!(lighting.directional(), 3.0);
    }
}
