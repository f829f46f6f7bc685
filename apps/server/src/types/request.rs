// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request types for the API.

use serde::Deserialize;

/// Body of `POST /api/v1/session/load`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadRequest {
    /// File name inside the objects directory, e.g. `GEALAN_S9000_Door_1100x2000-IFC4.ifc`.
    pub file_name: String,
}

/// Target dimensions in metres; omitted fields keep the current target.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DimensionsRequest {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub depth: Option<f64>,
}

/// Drag gesture step.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DragRequest {
    Start,
    /// Pointer hit on the ground plane, world coordinates.
    Move { position: [f64; 3] },
    End,
}

/// New light intensities; omitted fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LightingRequest {
    #[serde(default)]
    pub directional: Option<f64>,
    #[serde(default)]
    pub ambient: Option<f64>,
}

/// Query string of the property endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertiesQuery {
    /// Search text applied to group names, property names and values.
    #[serde(default)]
    pub q: Option<String>,
}
