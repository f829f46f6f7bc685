// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC entity types
//!
//! Only the types the showcase actually interprets get a variant; every other
//! entity keeps its upper-case STEP name in [`IfcType::Other`].

use std::fmt;

macro_rules! ifc_types {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// IFC entity type
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum IfcType {
            $($variant,)*
            /// Any entity type without dedicated handling (upper-case STEP name)
            Other(String),
        }

        impl IfcType {
            /// Resolve a STEP type name (case-insensitive)
            pub fn from_name(name: &str) -> Self {
                let upper = name.to_ascii_uppercase();
                match upper.as_str() {
                    $($name => IfcType::$variant,)*
                    _ => IfcType::Other(upper),
                }
            }

            /// Upper-case STEP name, as written in the file
            pub fn as_str(&self) -> &str {
                match self {
                    $(IfcType::$variant => $name,)*
                    IfcType::Other(name) => name,
                }
            }
        }
    };
}

ifc_types! {
    // Project and spatial structure
    IfcProject => "IFCPROJECT",
    IfcSite => "IFCSITE",
    IfcBuilding => "IFCBUILDING",
    IfcBuildingStorey => "IFCBUILDINGSTOREY",
    IfcSpace => "IFCSPACE",

    // Units
    IfcUnitAssignment => "IFCUNITASSIGNMENT",
    IfcSIUnit => "IFCSIUNIT",
    IfcConversionBasedUnit => "IFCCONVERSIONBASEDUNIT",
    IfcMeasureWithUnit => "IFCMEASUREWITHUNIT",

    // Placement
    IfcLocalPlacement => "IFCLOCALPLACEMENT",
    IfcAxis2Placement2D => "IFCAXIS2PLACEMENT2D",
    IfcAxis2Placement3D => "IFCAXIS2PLACEMENT3D",
    IfcCartesianPoint => "IFCCARTESIANPOINT",
    IfcDirection => "IFCDIRECTION",
    IfcCartesianTransformationOperator3D => "IFCCARTESIANTRANSFORMATIONOPERATOR3D",
    IfcCartesianTransformationOperator3DnonUniform => "IFCCARTESIANTRANSFORMATIONOPERATOR3DNONUNIFORM",

    // Representation
    IfcProductDefinitionShape => "IFCPRODUCTDEFINITIONSHAPE",
    IfcShapeRepresentation => "IFCSHAPEREPRESENTATION",
    IfcMappedItem => "IFCMAPPEDITEM",
    IfcRepresentationMap => "IFCREPRESENTATIONMAP",
    IfcExtrudedAreaSolid => "IFCEXTRUDEDAREASOLID",
    IfcFacetedBrep => "IFCFACETEDBREP",
    IfcClosedShell => "IFCCLOSEDSHELL",
    IfcOpenShell => "IFCOPENSHELL",
    IfcFace => "IFCFACE",
    IfcFaceBound => "IFCFACEBOUND",
    IfcFaceOuterBound => "IFCFACEOUTERBOUND",
    IfcPolyLoop => "IFCPOLYLOOP",
    IfcShellBasedSurfaceModel => "IFCSHELLBASEDSURFACEMODEL",
    IfcTriangulatedFaceSet => "IFCTRIANGULATEDFACESET",
    IfcPolygonalFaceSet => "IFCPOLYGONALFACESET",
    IfcCartesianPointList2D => "IFCCARTESIANPOINTLIST2D",
    IfcCartesianPointList3D => "IFCCARTESIANPOINTLIST3D",
    IfcBooleanResult => "IFCBOOLEANRESULT",
    IfcBooleanClippingResult => "IFCBOOLEANCLIPPINGRESULT",

    // Profiles and curves
    IfcRectangleProfileDef => "IFCRECTANGLEPROFILEDEF",
    IfcCircleProfileDef => "IFCCIRCLEPROFILEDEF",
    IfcArbitraryClosedProfileDef => "IFCARBITRARYCLOSEDPROFILEDEF",
    IfcArbitraryProfileDefWithVoids => "IFCARBITRARYPROFILEDEFWITHVOIDS",
    IfcPolyline => "IFCPOLYLINE",
    IfcIndexedPolyCurve => "IFCINDEXEDPOLYCURVE",

    // Properties and relationships
    IfcPropertySet => "IFCPROPERTYSET",
    IfcPropertySingleValue => "IFCPROPERTYSINGLEVALUE",
    IfcElementQuantity => "IFCELEMENTQUANTITY",
    IfcQuantityLength => "IFCQUANTITYLENGTH",
    IfcQuantityArea => "IFCQUANTITYAREA",
    IfcQuantityVolume => "IFCQUANTITYVOLUME",
    IfcQuantityCount => "IFCQUANTITYCOUNT",
    IfcQuantityWeight => "IFCQUANTITYWEIGHT",
    IfcQuantityTime => "IFCQUANTITYTIME",
    IfcRelDefinesByProperties => "IFCRELDEFINESBYPROPERTIES",
    IfcRelAggregates => "IFCRELAGGREGATES",
    IfcRelContainedInSpatialStructure => "IFCRELCONTAINEDINSPATIALSTRUCTURE",

    // Elements the demo catalog ships
    IfcDoor => "IFCDOOR",
    IfcWindow => "IFCWINDOW",
}

impl IfcType {
    /// Spatial structure elements (project excluded)
    pub fn is_spatial(&self) -> bool {
        matches!(
            self,
            IfcType::IfcSite | IfcType::IfcBuilding | IfcType::IfcBuildingStorey | IfcType::IfcSpace
        )
    }

    /// Physical quantity entities found in IfcElementQuantity
    pub fn quantity_kind(&self) -> Option<&'static str> {
        match self {
            IfcType::IfcQuantityLength => Some("length"),
            IfcType::IfcQuantityArea => Some("area"),
            IfcType::IfcQuantityVolume => Some("volume"),
            IfcType::IfcQuantityCount => Some("count"),
            IfcType::IfcQuantityWeight => Some("weight"),
            IfcType::IfcQuantityTime => Some("time"),
            _ => None,
        }
    }

    /// Readable IFC name: IFCBUILDINGSTOREY -> IfcBuildingStorey for known
    /// types, the raw STEP name otherwise
    pub fn display_name(&self) -> String {
        match self {
            IfcType::Other(name) => name.clone(),
            known => format!("{:?}", known),
        }
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_type_round_trip() {
        assert_eq!(IfcType::from_name("IFCDOOR"), IfcType::IfcDoor);
        assert_eq!(IfcType::from_name("IfcDoor"), IfcType::IfcDoor);
        assert_eq!(IfcType::IfcDoor.as_str(), "IFCDOOR");
    }

    #[test]
    fn test_unknown_type_keeps_name() {
        let ty = IfcType::from_name("IfcFurnishingElement");
        assert_eq!(ty, IfcType::Other("IFCFURNISHINGELEMENT".to_string()));
        assert_eq!(ty.as_str(), "IFCFURNISHINGELEMENT");
        assert_eq!(ty.display_name(), "IFCFURNISHINGELEMENT");
    }

    #[test]
    fn test_display_name_for_known_type() {
        assert_eq!(IfcType::IfcBuildingStorey.display_name(), "IfcBuildingStorey");
    }
}
