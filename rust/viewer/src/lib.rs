// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BIM Showcase Viewer
//!
//! Headless viewer state for IFC models: a world with scene, camera, grid
//! and lights; a registry of converted ("Fragments") models; and the
//! interactions built on top of them.
//!
//! - **Dimension editing**: rescale a model to a target width, height and
//!   depth ([`dimensions`])
//! - **Drag-to-move** through an invisible helper box ([`drag`])
//! - **2D views**: floor plans and elevations ([`views`])
//! - **Property inspector** with search and TSV export ([`selection`])
//!
//! ```rust,ignore
//! use bim_showcase_viewer::{Dimensions, IfcImporter, ObjectsDir, ViewerSession};
//!
//! let mut session = ViewerSession::new();
//! let objects = ObjectsDir::new("objects");
//! session.load(&objects, &IfcImporter::new(), "GEALAN_S9000_Door_1100x2000-IFC4.ifc")?;
//!
//! session.set_target_dimensions(Dimensions::new(2.2, 2.0, 0.07))?;
//! session.apply_dimensions()?;
//! println!("{}", session.status_line().unwrap_or_default());
//! ```

pub mod camera;
pub mod dimensions;
pub mod drag;
pub mod error;
pub mod fragments;
pub mod importer;
pub mod scene;
pub mod selection;
pub mod session;
pub mod source;
pub mod views;
pub mod world;

pub use camera::Camera;
pub use dimensions::{
    apply_scale, compute_scale, compute_scale_with, reset_scale, Axis, AxisConvention, Dimension,
    DimensionError, Dimensions, ScaleFactors,
};
pub use drag::DragHelper;
pub use error::{Result, ViewerError};
pub use fragments::{ConversionStats, ConvertedModel, FragmentsModel, FragmentsModels, SceneRefresh};
pub use importer::IfcImporter;
pub use scene::{ObjectId, Scene, SceneObject, Transform};
pub use selection::Selection;
pub use session::{LoadTicket, LoadedModel, ViewerSession};
pub use source::{model_id, validate_file_name, CatalogEntry, ModelSource, ObjectsDir, DEMO_CATALOG};
pub use views::{Facing, ViewDefinition, ViewKind};
pub use world::{Grid, Lighting, World};
