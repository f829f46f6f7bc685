// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element property extraction for the property inspector.
//!
//! Property and quantity sets reach an element through
//! IfcRelDefinesByProperties; the index built here maps element ids to the
//! property definitions attached to them so a selection can be answered
//! without rescanning the file.

use crate::attributes::DecodedEntity;
use crate::decoder::EntityDecoder;
use crate::error::Result;
use crate::parser::EntityScanner;
use crate::schema::IfcType;
use rustc_hash::FxHashMap;

/// A single named value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Property {
    pub name: String,
    pub value: String,
    /// Measure/type name of the value, e.g. IFCLABEL or "length"
    pub value_type: Option<String>,
}

/// Property set or quantity set attached to an element
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyGroup {
    pub id: u32,
    pub name: String,
    pub kind: PropertyGroupKind,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PropertyGroupKind {
    PropertySet,
    QuantitySet,
}

/// Everything the inspector shows for one element
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementProperties {
    pub express_id: u32,
    pub ifc_type: String,
    pub global_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub object_type: Option<String>,
    pub tag: Option<String>,
    pub groups: Vec<PropertyGroup>,
}

impl ElementProperties {
    /// Case-insensitive search over group names, property names and values.
    /// Attributes are always kept; groups without a match are dropped, and
    /// a group whose own name matches keeps all its properties.
    pub fn filter(&self, query: &str) -> ElementProperties {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.clone();
        }

        let groups = self
            .groups
            .iter()
            .filter_map(|group| {
                if group.name.to_lowercase().contains(&needle) {
                    return Some(group.clone());
                }
                let properties: Vec<Property> = group
                    .properties
                    .iter()
                    .filter(|p| {
                        p.name.to_lowercase().contains(&needle)
                            || p.value.to_lowercase().contains(&needle)
                    })
                    .cloned()
                    .collect();
                (!properties.is_empty()).then(|| PropertyGroup {
                    properties,
                    ..group.clone()
                })
            })
            .collect();

        ElementProperties {
            groups,
            ..self.clone()
        }
    }

    /// Tab-separated export: one row per value, header first
    pub fn to_tsv(&self) -> String {
        let mut out = String::from("Group\tName\tValue\n");
        let mut row = |group: &str, name: &str, value: &str| {
            out.push_str(&tsv_cell(group));
            out.push('\t');
            out.push_str(&tsv_cell(name));
            out.push('\t');
            out.push_str(&tsv_cell(value));
            out.push('\n');
        };

        row("Attributes", "ExpressID", &self.express_id.to_string());
        row("Attributes", "Type", &self.ifc_type);
        let attributes = [
            ("GlobalId", &self.global_id),
            ("Name", &self.name),
            ("Description", &self.description),
            ("ObjectType", &self.object_type),
            ("Tag", &self.tag),
        ];
        for (name, value) in attributes {
            if let Some(value) = value {
                row("Attributes", name, value);
            }
        }

        for group in &self.groups {
            for property in &group.properties {
                row(&group.name, &property.name, &property.value);
            }
        }

        out
    }
}

fn tsv_cell(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

/// Element id -> ids of property definitions (IfcPropertySet / IfcElementQuantity)
#[derive(Debug, Clone, Default)]
pub struct PropertyIndex {
    definitions: FxHashMap<u32, Vec<u32>>,
}

impl PropertyIndex {
    /// Scan IfcRelDefinesByProperties relationships
    pub fn build(content: &str, decoder: &mut EntityDecoder) -> Self {
        let mut definitions: FxHashMap<u32, Vec<u32>> = FxHashMap::default();
        let mut scanner = EntityScanner::new(content);
        let mut relationships = 0usize;

        while let Some((id, type_name, start, end)) = scanner.next_entity() {
            if !type_name.eq_ignore_ascii_case("IFCRELDEFINESBYPROPERTIES") {
                continue;
            }
            let rel = match decoder.decode_at(start, end) {
                Ok(rel) => rel,
                Err(e) => {
                    tracing::warn!(id, error = %e, "Skipping malformed IfcRelDefinesByProperties");
                    continue;
                }
            };

            // [4]=RelatedObjects, [5]=RelatingPropertyDefinition
            let Some(definition) = rel.get_ref(5) else {
                continue;
            };
            relationships += 1;
            for element in rel.get_refs(4) {
                definitions.entry(element).or_default().push(definition);
            }
        }

        tracing::debug!(
            relationships,
            elements = definitions.len(),
            "Built property index"
        );

        Self { definitions }
    }

    pub fn definitions_for(&self, element_id: u32) -> &[u32] {
        self.definitions
            .get(&element_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Collect the full property view of one element
    pub fn element_properties(
        &self,
        decoder: &mut EntityDecoder,
        element_id: u32,
    ) -> Result<ElementProperties> {
        let element = decoder.decode_by_id(element_id)?;

        let mut groups = Vec::new();
        for &definition_id in self.definitions_for(element_id) {
            let definition = match decoder.decode_by_id(definition_id) {
                Ok(definition) => definition,
                Err(e) => {
                    tracing::warn!(definition_id, error = %e, "Unreadable property definition");
                    continue;
                }
            };
            if let Some(group) = read_group(decoder, &definition)? {
                groups.push(group);
            }
        }

        // IfcRoot/IfcObject/IfcElement layout:
        // [0]=GlobalId, [2]=Name, [3]=Description, [4]=ObjectType, [7]=Tag
        let text = |index: usize| element.get_string(index).map(str::to_string);
        Ok(ElementProperties {
            express_id: element_id,
            ifc_type: element.ifc_type.display_name(),
            global_id: text(0),
            name: text(2),
            description: text(3),
            object_type: text(4),
            tag: text(7),
            groups,
        })
    }
}

fn read_group(
    decoder: &mut EntityDecoder,
    definition: &DecodedEntity,
) -> Result<Option<PropertyGroup>> {
    let name = definition.get_string(2).unwrap_or_default().to_string();

    let (kind, members) = match definition.ifc_type {
        // IfcPropertySet: [4]=HasProperties
        IfcType::IfcPropertySet => (PropertyGroupKind::PropertySet, definition.get_refs(4)),
        // IfcElementQuantity: [4]=MethodOfMeasurement, [5]=Quantities
        IfcType::IfcElementQuantity => (PropertyGroupKind::QuantitySet, definition.get_refs(5)),
        _ => return Ok(None),
    };

    let mut properties = Vec::with_capacity(members.len());
    for member_id in members {
        let member = decoder.decode_by_id(member_id)?;
        if let Some(property) = read_property(&member) {
            properties.push(property);
        }
    }

    Ok(Some(PropertyGroup {
        id: definition.id,
        name,
        kind,
        properties,
    }))
}

fn read_property(entity: &DecodedEntity) -> Option<Property> {
    let name = entity.get_string(0)?.to_string();

    if entity.ifc_type == IfcType::IfcPropertySingleValue {
        // [0]=Name, [1]=Description, [2]=NominalValue, [3]=Unit
        let value = entity.get(2)?;
        return Some(Property {
            name,
            value: value.display_value(),
            value_type: value.type_name().map(str::to_string),
        });
    }

    // IfcPhysicalSimpleQuantity: [0]=Name, [1]=Description, [2]=Unit, [3]=Value
    let kind = entity.ifc_type.quantity_kind()?;
    let value = entity.get_float(3)?;
    Some(Property {
        name,
        value: value.to_string(),
        value_type: Some(kind.to_string()),
    })
}
