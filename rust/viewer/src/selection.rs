// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Selected element and its property table.

use bim_showcase_core::ElementProperties;

#[derive(Debug, Clone, Default)]
pub struct Selection {
    current: Option<ElementProperties>,
}

impl Selection {
    pub fn select(&mut self, properties: ElementProperties) {
        tracing::debug!(
            express_id = properties.express_id,
            groups = properties.groups.len(),
            "Element selected"
        );
        self.current = Some(properties);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn selected_id(&self) -> Option<u32> {
        self.current.as_ref().map(|p| p.express_id)
    }

    /// Property table, narrowed by a search query when one is given
    pub fn table(&self, query: Option<&str>) -> Option<ElementProperties> {
        let current = self.current.as_ref()?;
        Some(match query {
            Some(query) => current.filter(query),
            None => current.clone(),
        })
    }

    /// Tab-separated export of the full table
    pub fn export_tsv(&self) -> Option<String> {
        self.current.as_ref().map(ElementProperties::to_tsv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bim_showcase_core::{Property, PropertyGroup, PropertyGroupKind};

    fn door() -> ElementProperties {
        ElementProperties {
            express_id: 100,
            ifc_type: "IfcDoor".into(),
            global_id: Some("3ZJ$g1ZuL2kf_kp2cgE2wW".into()),
            name: Some("Door".into()),
            description: None,
            object_type: None,
            tag: None,
            groups: vec![
                PropertyGroup {
                    id: 201,
                    name: "Pset_DoorCommon".into(),
                    kind: PropertyGroupKind::PropertySet,
                    properties: vec![Property {
                        name: "FireRating".into(),
                        value: "EI30".into(),
                        value_type: Some("IFCLABEL".into()),
                    }],
                },
                PropertyGroup {
                    id: 211,
                    name: "Qto_DoorBaseQuantities".into(),
                    kind: PropertyGroupKind::QuantitySet,
                    properties: vec![Property {
                        name: "Width".into(),
                        value: "1100".into(),
                        value_type: Some("length".into()),
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_select_filter_clear() {
        let mut selection = Selection::default();
        assert!(selection.table(None).is_none());

        selection.select(door());
        assert_eq!(selection.selected_id(), Some(100));
        assert_eq!(selection.table(None).unwrap().groups.len(), 2);

        let filtered = selection.table(Some("fire")).unwrap();
        assert_eq!(filtered.groups.len(), 1);
        assert_eq!(filtered.groups[0].name, "Pset_DoorCommon");

        assert!(selection.export_tsv().unwrap().starts_with("Group\tName\tValue"));

        selection.clear();
        assert!(selection.table(Some("fire")).is_none());
        assert!(selection.export_tsv().is_none());
    }
}
