// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response types for the API.

use bim_showcase_geometry::{Aabb, Point3, Vector3};
use bim_showcase_viewer::{Camera, Dimensions, Grid, Lighting, ViewDefinition, ViewKind};
use serde::Serialize;

fn point(p: &Point3<f64>) -> [f64; 3] {
    [p.x, p.y, p.z]
}

pub(crate) fn vector(v: &Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}

/// Width, height and depth in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensionsInfo {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl From<Dimensions> for DimensionsInfo {
    fn from(d: Dimensions) -> Self {
        Self {
            width: d.width,
            height: d.height,
            depth: d.depth,
        }
    }
}

/// Axis-aligned bounds in world coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct BoundsInfo {
    pub min: [f64; 3],
    pub max: [f64; 3],
    pub size: [f64; 3],
}

impl From<&Aabb> for BoundsInfo {
    fn from(b: &Aabb) -> Self {
        Self {
            min: point(&b.min),
            max: point(&b.max),
            size: vector(&b.size()),
        }
    }
}

/// Demo model offered by a load button.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogItem {
    pub file_name: &'static str,
    pub label: &'static str,
    pub model_id: String,
}

/// `GET /api/v1/models`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub catalog: Vec<CatalogItem>,
    /// `.ifc` files present in the objects directory.
    pub available: Vec<String>,
}

/// `POST /api/v1/session/load`.
#[derive(Debug, Clone, Serialize)]
pub struct LoadResponse {
    pub model_id: String,
    pub element_count: usize,
    pub bounds: BoundsInfo,
    pub original: DimensionsInfo,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CameraInfo {
    pub position: [f64; 3],
    pub target: [f64; 3],
    pub controls_enabled: bool,
}

impl From<&Camera> for CameraInfo {
    fn from(c: &Camera) -> Self {
        Self {
            position: point(&c.position),
            target: point(&c.target),
            controls_enabled: c.controls_enabled(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LightingInfo {
    pub directional: f64,
    pub ambient: f64,
}

impl From<&Lighting> for LightingInfo {
    fn from(l: &Lighting) -> Self {
        Self {
            directional: l.directional(),
            ambient: l.ambient(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GridInfo {
    pub primary_size: f64,
    pub secondary_size: f64,
    pub distance: f64,
    pub visible: bool,
}

impl From<&Grid> for GridInfo {
    fn from(g: &Grid) -> Self {
        Self {
            primary_size: g.primary_size,
            secondary_size: g.secondary_size,
            distance: g.distance,
            visible: g.visible,
        }
    }
}

/// `GET /api/v1/session`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub model_id: Option<String>,
    /// File name of a load in progress.
    pub loading: Option<String>,
    pub status: Option<String>,
    pub original: Option<DimensionsInfo>,
    pub target: Option<DimensionsInfo>,
    pub scale: Option<[f64; 3]>,
    pub position: Option<[f64; 3]>,
    pub bounds: Option<BoundsInfo>,
    pub selected: Option<u32>,
    pub camera: CameraInfo,
    pub lighting: LightingInfo,
    pub grid: GridInfo,
}

/// `POST /api/v1/session/dimensions/apply`.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyResponse {
    /// Multipliers on the load-time scale, per world axis.
    pub factors: [f64; 3],
    pub scale: [f64; 3],
    pub bounds: Option<BoundsInfo>,
    pub status: Option<String>,
}

/// `POST /api/v1/session/dimensions/reset`.
#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    pub dimensions: DimensionsInfo,
    pub scale: [f64; 3],
    pub status: Option<String>,
}

/// `POST /api/v1/session/drag`.
#[derive(Debug, Clone, Serialize)]
pub struct DragResponse {
    pub position: Option<[f64; 3]>,
    pub controls_enabled: bool,
}

/// A floor plan or elevation camera.
#[derive(Debug, Clone, Serialize)]
pub struct ViewInfo {
    pub id: String,
    pub name: String,
    /// `floor_plan` or `elevation`.
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storey_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facing: Option<&'static str>,
    pub position: [f64; 3],
    pub target: [f64; 3],
    pub up: [f64; 3],
    pub width: f64,
    pub height: f64,
}

impl From<&ViewDefinition> for ViewInfo {
    fn from(view: &ViewDefinition) -> Self {
        let (kind, storey_id, elevation, facing) = match &view.kind {
            ViewKind::FloorPlan {
                storey_id,
                elevation,
            } => ("floor_plan", Some(*storey_id), Some(*elevation), None),
            ViewKind::Elevation(facing) => ("elevation", None, None, Some(facing.name())),
        };
        Self {
            id: view.id.clone(),
            name: view.name.clone(),
            kind,
            storey_id,
            elevation,
            facing,
            position: point(&view.position),
            target: point(&view.target),
            up: vector(&view.up),
            width: view.width,
            height: view.height,
        }
    }
}
