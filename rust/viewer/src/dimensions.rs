// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dimension editing: proportional rescale of a model to target dimensions.
//!
//! Dimensions are semantic (width, height, depth); scale factors are per
//! world axis. [`AxisConvention`] maps one onto the other. The rescale is
//! always composed from the scale the object had at load time, so applying
//! the same target twice changes nothing and a reset restores the baseline
//! bit for bit.

use crate::fragments::SceneRefresh;
use crate::scene::Transform;
use nalgebra::Vector3;
use std::fmt;
use thiserror::Error;

/// World axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Semantic dimension of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Width,
    Height,
    Depth,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dimension::Width => "width",
            Dimension::Height => "height",
            Dimension::Depth => "depth",
        })
    }
}

/// Which world axis carries each semantic dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisConvention {
    pub width: Axis,
    pub height: Axis,
    pub depth: Axis,
}

impl AxisConvention {
    /// Height on world Z, width on X, depth on Y
    pub const Z_UP: AxisConvention = AxisConvention {
        width: Axis::X,
        height: Axis::Z,
        depth: Axis::Y,
    };

    pub fn axis_of(&self, dimension: Dimension) -> Axis {
        match dimension {
            Dimension::Width => self.width,
            Dimension::Height => self.height,
            Dimension::Depth => self.depth,
        }
    }

    /// Read semantic dimensions off a world-space size vector
    pub fn dimensions_from_size(&self, size: &Vector3<f64>) -> Dimensions {
        Dimensions {
            width: size[self.width.index()],
            height: size[self.height.index()],
            depth: size[self.depth.index()],
        }
    }
}

/// Width, height and depth in metres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Width => self.width,
            Dimension::Height => self.height,
            Dimension::Depth => self.depth,
        }
    }

    /// Round every value to centimetres
    pub fn rounded(&self) -> Dimensions {
        let round = |v: f64| (v * 100.0).round() / 100.0;
        Dimensions {
            width: round(self.width),
            height: round(self.height),
            depth: round(self.depth),
        }
    }

    fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> {
        [
            (Dimension::Width, self.width),
            (Dimension::Height, self.height),
            (Dimension::Depth, self.depth),
        ]
        .into_iter()
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "W: {:.2}m × H: {:.2}m × D: {:.2}m",
            self.width, self.height, self.depth
        )
    }
}

/// Per-axis multipliers relative to the load-time scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ScaleFactors {
    pub const IDENTITY: ScaleFactors = ScaleFactors {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DimensionError {
    #[error("Original {axis} is {value}; every axis needs a positive extent to rescale")]
    DegenerateOriginal { axis: Dimension, value: f64 },

    #[error("Target {axis} must be a positive finite number, got {value}")]
    InvalidTarget { axis: Dimension, value: f64 },
}

/// Scale factors under [`AxisConvention::Z_UP`]
pub fn compute_scale(
    target: &Dimensions,
    original: &Dimensions,
) -> Result<ScaleFactors, DimensionError> {
    compute_scale_with(target, original, AxisConvention::Z_UP)
}

/// Scale factors: target / original per dimension, placed on the axis the
/// convention assigns to that dimension
pub fn compute_scale_with(
    target: &Dimensions,
    original: &Dimensions,
    convention: AxisConvention,
) -> Result<ScaleFactors, DimensionError> {
    for (axis, value) in original.iter() {
        if !(value.is_finite() && value > 0.0) {
            return Err(DimensionError::DegenerateOriginal { axis, value });
        }
    }
    for (axis, value) in target.iter() {
        if !(value.is_finite() && value > 0.0) {
            return Err(DimensionError::InvalidTarget { axis, value });
        }
    }

    let mut factors = [1.0; 3];
    for (dimension, value) in target.iter() {
        factors[convention.axis_of(dimension).index()] = value / original.get(dimension);
    }

    Ok(ScaleFactors {
        x: factors[0],
        y: factors[1],
        z: factors[2],
    })
}

/// Set `transform.scale = original_scale ⊙ factors`, then refresh once
pub fn apply_scale(
    transform: &mut Transform,
    original_scale: &Vector3<f64>,
    factors: &ScaleFactors,
    refresh: &mut impl SceneRefresh,
) {
    transform.scale = original_scale.component_mul(&factors.as_vector());
    refresh.update(true);
}

/// Restore the load-time scale exactly, then refresh once
pub fn reset_scale(
    transform: &mut Transform,
    original_scale: &Vector3<f64>,
    refresh: &mut impl SceneRefresh,
) {
    transform.scale = *original_scale;
    refresh.update(true);
}
