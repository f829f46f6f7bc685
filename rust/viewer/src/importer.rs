// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC importer: raw IFC bytes to a [`ConvertedModel`].

use crate::error::{Result, ViewerError};
use crate::fragments::{ConversionStats, ConvertedModel};
use bim_showcase_core::{
    build_entity_index, ensure_step, EntityDecoder, PropertyIndex, SpatialStructure,
};
use bim_showcase_geometry::extract_model_geometry_indexed;
use std::sync::Arc;
use std::time::Instant;

/// Conversion stages reported to progress callbacks, in percent
pub mod stage {
    pub const STARTED: u8 = 0;
    pub const INDEXED: u8 = 20;
    pub const GEOMETRY: u8 = 50;
    pub const PROPERTIES: u8 = 80;
    pub const DONE: u8 = 100;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IfcImporter;

impl IfcImporter {
    pub fn new() -> Self {
        Self
    }

    /// Convert an IFC file, reporting progress as `(percent, message)`
    pub fn process<F>(&self, bytes: &[u8], mut progress: F) -> Result<ConvertedModel>
    where
        F: FnMut(u8, &str),
    {
        let start = Instant::now();
        let mut report = |percent: u8, message: &str| {
            tracing::debug!(percent, stage = message, "Conversion progress");
            progress(percent, message);
        };

        report(stage::STARTED, "Reading IFC");
        let text = std::str::from_utf8(bytes).map_err(|e| ViewerError::NotUtf8(e.valid_up_to()))?;
        ensure_step(text)?;

        let content: Arc<str> = Arc::from(text);
        let entity_index = Arc::new(build_entity_index(&content));
        report(stage::INDEXED, "Entity index built");

        let geometry = extract_model_geometry_indexed(&content, Arc::clone(&entity_index))?;
        report(stage::GEOMETRY, "Element bounds extracted");

        let mut decoder = EntityDecoder::with_arc_index(&content, Arc::clone(&entity_index));
        let properties = PropertyIndex::build(&content, &mut decoder);
        let spatial = SpatialStructure::build(&content, &mut decoder);
        report(stage::PROPERTIES, "Properties and spatial structure indexed");

        let stats = ConversionStats {
            byte_size: bytes.len(),
            entity_count: entity_index.len(),
            element_count: geometry.elements.len(),
            skipped_elements: geometry.skipped,
            property_definitions: properties.len(),
            convert_time_ms: start.elapsed().as_millis() as u64,
        };
        report(stage::DONE, "Conversion complete");

        tracing::info!(
            bytes = stats.byte_size,
            entities = stats.entity_count,
            elements = stats.element_count,
            skipped = stats.skipped_elements,
            convert_time_ms = stats.convert_time_ms,
            "IFC converted"
        );

        Ok(ConvertedModel {
            content,
            entity_index,
            geometry,
            properties,
            spatial,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DOOR: &str = include_str!("../../../tests/models/door_1100x2000.ifc");

    #[test]
    fn test_progress_stages_in_order() {
        let mut seen = Vec::new();
        let model = IfcImporter::new()
            .process(DOOR.as_bytes(), |percent, _| seen.push(percent))
            .unwrap();

        assert_eq!(seen, vec![0, 20, 50, 80, 100]);
        assert_eq!(model.stats().element_count, 1);
        assert_eq!(model.stats().byte_size, DOOR.len());
        assert_relative_eq!(model.bounds().size().x, 1.1, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_non_step_input() {
        let result = IfcImporter::new().process(b"PK\x03\x04 not an ifc", |_, _| {});
        assert!(matches!(result, Err(ViewerError::Ifc(_))));
    }

    #[test]
    fn test_rejects_invalid_utf8() {
        let result = IfcImporter::new().process(b"ISO-10303-21;\xff\xfe", |_, _| {});
        assert!(matches!(result, Err(ViewerError::NotUtf8(13))));
    }
}
