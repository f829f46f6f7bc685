// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial structure: project → site → building → storey → elements.

use crate::decoder::EntityDecoder;
use crate::parser::EntityScanner;
use crate::schema::IfcType;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpatialNode {
    pub id: u32,
    pub ifc_type: String,
    pub name: Option<String>,
    /// IfcBuildingStorey elevation, in file units
    pub elevation: Option<f64>,
    pub parent: Option<u32>,
    pub children: Vec<u32>,
    /// Elements contained directly in this node
    pub elements: Vec<u32>,
}

/// Storey summary used for floor plans
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Storey {
    pub id: u32,
    pub name: String,
    /// Elevation in file units (0 when the file omits it)
    pub elevation: f64,
    pub element_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SpatialStructure {
    nodes: FxHashMap<u32, SpatialNode>,
    project_id: Option<u32>,
}

impl SpatialStructure {
    /// Build the hierarchy from aggregation and containment relationships
    pub fn build(content: &str, decoder: &mut EntityDecoder) -> Self {
        let mut structure = SpatialStructure::default();
        let mut aggregates: Vec<(u32, Vec<u32>)> = Vec::new();
        let mut containment: Vec<(u32, Vec<u32>)> = Vec::new();

        let mut scanner = EntityScanner::new(content);
        while let Some((id, type_name, start, end)) = scanner.next_entity() {
            let ifc_type = IfcType::from_name(type_name);
            let is_structure = ifc_type == IfcType::IfcProject || ifc_type.is_spatial();
            let is_relationship = matches!(
                ifc_type,
                IfcType::IfcRelAggregates | IfcType::IfcRelContainedInSpatialStructure
            );
            if !is_structure && !is_relationship {
                continue;
            }

            let entity = match decoder.decode_at(start, end) {
                Ok(entity) => entity,
                Err(e) => {
                    tracing::warn!(id, error = %e, "Skipping malformed spatial entity");
                    continue;
                }
            };

            match ifc_type {
                // [4]=RelatingObject, [5]=RelatedObjects
                IfcType::IfcRelAggregates => {
                    if let Some(parent) = entity.get_ref(4) {
                        aggregates.push((parent, entity.get_refs(5)));
                    }
                }
                // [4]=RelatedElements, [5]=RelatingStructure
                IfcType::IfcRelContainedInSpatialStructure => {
                    if let Some(parent) = entity.get_ref(5) {
                        containment.push((parent, entity.get_refs(4)));
                    }
                }
                _ => {
                    if ifc_type == IfcType::IfcProject {
                        structure.project_id = Some(id);
                    }
                    let elevation = (ifc_type == IfcType::IfcBuildingStorey)
                        .then(|| entity.get_float(9))
                        .flatten();
                    structure.nodes.insert(
                        id,
                        SpatialNode {
                            id,
                            ifc_type: ifc_type.display_name(),
                            name: entity.get_string(2).map(str::to_string),
                            elevation,
                            parent: None,
                            children: Vec::new(),
                            elements: Vec::new(),
                        },
                    );
                }
            }
        }

        for (parent, children) in aggregates {
            for child in children {
                // Aggregation of non-spatial parts (e.g. a window's panels) is ignored
                if !structure.nodes.contains_key(&child) {
                    continue;
                }
                if let Some(node) = structure.nodes.get_mut(&child) {
                    node.parent = Some(parent);
                }
                if let Some(node) = structure.nodes.get_mut(&parent) {
                    node.children.push(child);
                }
            }
        }

        for (parent, elements) in containment {
            if let Some(node) = structure.nodes.get_mut(&parent) {
                node.elements.extend(elements);
            }
        }

        tracing::debug!(
            nodes = structure.nodes.len(),
            project = ?structure.project_id,
            "Built spatial structure"
        );

        structure
    }

    pub fn project_id(&self) -> Option<u32> {
        self.project_id
    }

    pub fn node(&self, id: u32) -> Option<&SpatialNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Building storeys ordered by elevation, then id
    pub fn storeys(&self) -> Vec<Storey> {
        let mut storeys: Vec<Storey> = self
            .nodes
            .values()
            .filter(|node| node.ifc_type == "IfcBuildingStorey")
            .map(|node| Storey {
                id: node.id,
                name: node
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Storey #{}", node.id)),
                elevation: node.elevation.unwrap_or(0.0),
                element_count: node.elements.len(),
            })
            .collect();

        storeys.sort_by(|a, b| {
            a.elevation
                .total_cmp(&b.elevation)
                .then_with(|| a.id.cmp(&b.id))
        });
        storeys
    }

    /// Spatial container of an element, if any
    pub fn container_of(&self, element_id: u32) -> Option<&SpatialNode> {
        self.nodes
            .values()
            .find(|node| node.elements.contains(&element_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = "DATA;
#1=IFCPROJECT('p',$,'Project',$,$,$,$,$,$);
#2=IFCSITE('s',$,'Site',$,$,$,$,$,.ELEMENT.,$,$,$,$,$);
#3=IFCBUILDING('b',$,'Building',$,$,$,$,$,.ELEMENT.,$,$,$);
#4=IFCBUILDINGSTOREY('u',$,'Upper',$,$,$,$,$,.ELEMENT.,3000.);
#5=IFCBUILDINGSTOREY('g',$,'Ground',$,$,$,$,$,.ELEMENT.,0.);
#6=IFCRELAGGREGATES('r1',$,$,$,#1,(#2));
#7=IFCRELAGGREGATES('r2',$,$,$,#2,(#3));
#8=IFCRELAGGREGATES('r3',$,$,$,#3,(#4,#5));
#9=IFCRELCONTAINEDINSPATIALSTRUCTURE('c1',$,$,$,(#20,#21),#5);
#20=IFCDOOR('d',$,'Door',$,$,$,$,$,$,$,$,$,$);
#21=IFCWINDOW('w',$,'Window',$,$,$,$,$,$,$,$,$,$);
ENDSEC;
";

    #[test]
    fn test_hierarchy() {
        let mut decoder = EntityDecoder::new(CONTENT);
        let structure = SpatialStructure::build(CONTENT, &mut decoder);

        assert_eq!(structure.project_id(), Some(1));
        assert_eq!(structure.len(), 5);
        assert_eq!(structure.node(3).unwrap().children, vec![4, 5]);
        assert_eq!(structure.node(5).unwrap().parent, Some(3));
        assert_eq!(structure.container_of(21).unwrap().id, 5);
        assert!(structure.container_of(1).is_none());
    }

    #[test]
    fn test_storeys_sorted_by_elevation() {
        let mut decoder = EntityDecoder::new(CONTENT);
        let storeys = SpatialStructure::build(CONTENT, &mut decoder).storeys();

        assert_eq!(storeys.len(), 2);
        assert_eq!(storeys[0].name, "Ground");
        assert_eq!(storeys[0].element_count, 2);
        assert_eq!(storeys[1].name, "Upper");
        assert_eq!(storeys[1].elevation, 3000.0);
    }
}
