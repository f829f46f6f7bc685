// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity Decoder - On-demand entity parsing
//!
//! Entities are located through a byte-offset index and decoded lazily,
//! so only the part of the graph a caller actually walks gets parsed.

use crate::attributes::{AttributeValue, DecodedEntity};
use crate::error::{Error, Result};
use crate::parser::{data_section_start, find_statement_end, parse_entity};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Pre-built entity index type: entity id -> (statement start, statement end)
pub type EntityIndex = FxHashMap<u32, (usize, usize)>;

/// Build entity index from content - O(n) scan using memchr
pub fn build_entity_index(content: &str) -> EntityIndex {
    let bytes = content.as_bytes();
    let len = bytes.len();

    // Roughly 1 entity per 50 bytes
    let mut index = FxHashMap::with_capacity_and_hasher(len / 50, Default::default());
    let mut pos = data_section_start(content);

    while pos < len {
        let start = match memchr::memchr(b'#', &bytes[pos..]) {
            Some(offset) => pos + offset,
            None => break,
        };
        pos = start + 1;

        let id_start = pos;
        while pos < len && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        let id_end = pos;

        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        if id_end > id_start && pos < len && bytes[pos] == b'=' {
            let Some(end) = find_statement_end(bytes, pos) else {
                break; // unterminated statement
            };
            if let Ok(id) = content[id_start..id_end].parse::<u32>() {
                index.insert(id, (start, end));
            }
            pos = end;
        }
    }

    index
}

/// Entity decoder for lazy parsing; decoded entities are cached behind `Arc`
pub struct EntityDecoder<'a> {
    content: &'a str,
    cache: FxHashMap<u32, Arc<DecodedEntity>>,
    /// Shared so parallel workers can reuse one index
    entity_index: Arc<EntityIndex>,
}

impl<'a> EntityDecoder<'a> {
    /// Create a decoder, building the index eagerly
    pub fn new(content: &'a str) -> Self {
        Self::with_arc_index(content, Arc::new(build_entity_index(content)))
    }

    /// Create decoder with shared Arc index (for parallel processing)
    pub fn with_arc_index(content: &'a str, index: Arc<EntityIndex>) -> Self {
        Self {
            content,
            cache: FxHashMap::default(),
            entity_index: index,
        }
    }

    pub fn content(&self) -> &'a str {
        self.content
    }

    pub fn index(&self) -> &Arc<EntityIndex> {
        &self.entity_index
    }

    /// Decode the statement at the given byte range
    pub fn decode_at(&mut self, start: usize, end: usize) -> Result<Arc<DecodedEntity>> {
        let line = &self.content[start..end];
        let (id, ifc_type, tokens) = parse_entity(line).map_err(|e| {
            Error::parse(
                start,
                format!("{}, input: {:?}", e, &line[..line.len().min(100)]),
            )
        })?;

        if let Some(entity) = self.cache.get(&id) {
            return Ok(entity.clone());
        }

        let attributes = tokens.iter().map(AttributeValue::from_token).collect();
        let entity = Arc::new(DecodedEntity::new(id, ifc_type, attributes));
        self.cache.insert(id, entity.clone());
        Ok(entity)
    }

    /// Decode entity by ID - O(1) lookup using the entity index
    pub fn decode_by_id(&mut self, entity_id: u32) -> Result<Arc<DecodedEntity>> {
        if let Some(entity) = self.cache.get(&entity_id) {
            return Ok(entity.clone());
        }

        let (start, end) = self
            .entity_index
            .get(&entity_id)
            .copied()
            .ok_or(Error::EntityNotFound(entity_id))?;

        self.decode_at(start, end)
    }

    /// Resolve entity reference (follow #ID); None for null/derived values
    pub fn resolve_ref(&mut self, attr: &AttributeValue) -> Result<Option<Arc<DecodedEntity>>> {
        match attr.as_entity_ref() {
            Some(id) => Ok(Some(self.decode_by_id(id)?)),
            None => Ok(None),
        }
    }

    /// Resolve a list of entity references, skipping non-reference items
    pub fn resolve_ref_list(&mut self, attr: &AttributeValue) -> Result<Vec<Arc<DecodedEntity>>> {
        let list = attr
            .as_list()
            .ok_or_else(|| Error::parse(0, "Expected list"))?;

        let mut entities = Vec::with_capacity(list.len());
        for item in list {
            if let Some(id) = item.as_entity_ref() {
                entities.push(self.decode_by_id(id)?);
            }
        }
        Ok(entities)
    }

    /// Fast path for IFCCARTESIANPOINT: read coordinates from raw bytes
    /// without tokenizing. Missing Z (2D points) reads as 0.
    pub fn get_cartesian_point_fast(&self, entity_id: u32) -> Option<(f64, f64, f64)> {
        let &(start, end) = self.entity_index.get(&entity_id)?;
        let bytes = &self.content.as_bytes()[start..end];

        let open = memchr::memmem::find(bytes, b"((")?;
        let close = open + memchr::memchr(b')', &bytes[open..])?;
        let mut coords = bytes[open + 2..close]
            .split(|&b| b == b',')
            .map(|part| fast_float::parse::<f64, _>(trim_ascii(part)).ok());

        let x = coords.next()??;
        let y = coords.next()??;
        let z = coords.next().flatten().unwrap_or(0.0);
        Some((x, y, z))
    }

    /// Drop decoded entities to free memory
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &bytes[start..end]
}
