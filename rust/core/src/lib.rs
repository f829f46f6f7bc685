// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BIM Showcase Core
//!
//! STEP/IFC reading built with [nom](https://docs.rs/nom): just enough of the
//! format to place models in a scene and inspect them.
//!
//! - **Entity scanning**: walk the DATA section statement by statement
//!   ([memchr](https://docs.rs/memchr) accelerated, quote aware)
//! - **Lazy decoding**: byte-offset index plus on-demand attribute parsing
//! - **Units**: length unit scale from the project's unit assignment
//! - **Properties**: property and quantity sets per element, search, TSV export
//! - **Spatial structure**: project/site/building/storey hierarchy
//!
//! ```rust,ignore
//! use bim_showcase_core::{EntityDecoder, EntityScanner};
//!
//! let mut scanner = EntityScanner::new(content);
//! while let Some((id, type_name, _, _)) = scanner.next_entity() {
//!     println!("#{} {}", id, type_name);
//! }
//!
//! let mut decoder = EntityDecoder::new(content);
//! let door = decoder.decode_by_id(42)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: serialization for property and spatial views

pub mod attributes;
pub mod decoder;
pub mod error;
pub mod parser;
pub mod properties;
pub mod schema;
pub mod spatial;
pub mod units;

pub use attributes::{decode_step_string, AttributeValue, DecodedEntity};
pub use decoder::{build_entity_index, EntityDecoder, EntityIndex};
pub use error::{Error, Result};
pub use parser::{parse_entity, EntityScanner, Token};
pub use properties::{ElementProperties, Property, PropertyGroup, PropertyGroupKind, PropertyIndex};
pub use schema::IfcType;
pub use spatial::{SpatialNode, SpatialStructure, Storey};
pub use units::{extract_length_unit_scale, get_si_prefix_multiplier, length_unit_scale};

/// Check the ISO-10303-21 envelope without parsing the data section
pub fn ensure_step(content: &str) -> Result<()> {
    let head = content.trim_start_matches('\u{feff}').trim_start();
    if head.starts_with("ISO-10303-21;") {
        Ok(())
    } else {
        let preview: String = head.chars().take(32).collect();
        Err(Error::NotStep(preview))
    }
}
