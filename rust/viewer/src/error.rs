// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::dimensions::DimensionError;
use thiserror::Error;

/// Result type for viewer operations
pub type Result<T> = std::result::Result<T, ViewerError>;

/// Errors surfaced by the viewer session
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("No model loaded")]
    NoModelLoaded,

    #[error("Load of {file} was superseded by a newer load")]
    Superseded { file: String },

    #[error("Invalid model file name: {0}")]
    InvalidFileName(String),

    #[error("Model file not found: {0}")]
    NotFound(String),

    #[error("Model file {file} is {size} bytes, limit is {limit}")]
    TooLarge { file: String, size: u64, limit: u64 },

    #[error("Model file is not valid UTF-8 at byte {0}")]
    NotUtf8(usize),

    #[error("Element #{0} is not part of the loaded model")]
    UnknownElement(u32),

    #[error("No drag in progress")]
    NotDragging,

    #[error(transparent)]
    Dimension(#[from] DimensionError),

    #[error("IFC error: {0}")]
    Ifc(#[from] bim_showcase_core::Error),

    #[error("Geometry error: {0}")]
    Geometry(#[from] bim_showcase_geometry::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
