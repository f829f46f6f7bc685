// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length unit extraction
//!
//! Follows IFCPROJECT → IFCUNITASSIGNMENT → length unit and returns the
//! multiplier that converts file coordinates to metres.

use crate::decoder::EntityDecoder;
use crate::error::Result;
use crate::parser::EntityScanner;
use crate::schema::IfcType;

/// SI prefix multipliers as defined for IfcSIPrefix
#[inline]
pub fn get_si_prefix_multiplier(prefix: &str) -> f64 {
    match prefix {
        "ATTO" => 1e-18,
        "FEMTO" => 1e-15,
        "PICO" => 1e-12,
        "NANO" => 1e-9,
        "MICRO" => 1e-6,
        "MILLI" => 1e-3,
        "CENTI" => 1e-2,
        "DECI" => 1e-1,
        "DECA" => 1e1,
        "HECTO" => 1e2,
        "KILO" => 1e3,
        "MEGA" => 1e6,
        "GIGA" => 1e9,
        "TERA" => 1e12,
        "PETA" => 1e15,
        "EXA" => 1e18,
        _ => 1.0,
    }
}

/// Locate the IFCPROJECT entity id
pub fn find_project_id(content: &str) -> Option<u32> {
    EntityScanner::new(content)
        .find_by_type("IFCPROJECT")
        .first()
        .map(|(id, _, _)| *id)
}

/// Length unit scale of the whole file (1.0 when no project or unit is found)
pub fn length_unit_scale(decoder: &mut EntityDecoder) -> Result<f64> {
    match find_project_id(decoder.content()) {
        Some(project_id) => extract_length_unit_scale(decoder, project_id),
        None => Ok(1.0),
    }
}

/// Extract length unit scale starting from the given IFCPROJECT
///
/// IfcSIUnit supplies a prefix (MILLI → 0.001); IfcConversionBasedUnit
/// (inch, foot) supplies a conversion factor through IfcMeasureWithUnit.
pub fn extract_length_unit_scale(decoder: &mut EntityDecoder, project_id: u32) -> Result<f64> {
    let project = decoder.decode_by_id(project_id)?;
    if project.ifc_type != IfcType::IfcProject {
        return Ok(1.0);
    }

    // IfcProject attribute 8: UnitsInContext
    let Some(units_ref) = project.get_ref(8) else {
        return Ok(1.0);
    };

    let assignment = decoder.decode_by_id(units_ref)?;
    if assignment.ifc_type != IfcType::IfcUnitAssignment {
        return Ok(1.0);
    }

    for unit_id in assignment.get_refs(0) {
        let Ok(unit) = decoder.decode_by_id(unit_id) else {
            continue;
        };

        match unit.ifc_type {
            // IfcSIUnit: Dimensions, UnitType, Prefix, Name
            IfcType::IfcSIUnit => {
                if unit.get(1).and_then(|v| v.as_enum()) != Some("LENGTHUNIT") {
                    continue;
                }
                let prefix = unit.get(2).and_then(|v| v.as_enum()).unwrap_or("");
                return Ok(get_si_prefix_multiplier(prefix));
            }
            // IfcConversionBasedUnit: Dimensions, UnitType, Name, ConversionFactor
            IfcType::IfcConversionBasedUnit => {
                if unit.get(1).and_then(|v| v.as_enum()) != Some("LENGTHUNIT") {
                    continue;
                }
                if let Some(scale) = conversion_factor(decoder, unit.get_ref(3))? {
                    return Ok(scale);
                }
            }
            _ => {}
        }
    }

    Ok(1.0)
}

/// IfcMeasureWithUnit: ValueComponent, UnitComponent (an SI unit, maybe prefixed)
fn conversion_factor(decoder: &mut EntityDecoder, measure_ref: Option<u32>) -> Result<Option<f64>> {
    let Some(measure_ref) = measure_ref else {
        return Ok(None);
    };
    let measure = decoder.decode_by_id(measure_ref)?;
    if measure.ifc_type != IfcType::IfcMeasureWithUnit {
        return Ok(None);
    }

    let Some(value) = measure.get_float(0) else {
        return Ok(None);
    };

    let base = match measure.get_ref(1) {
        Some(unit_ref) => {
            let unit = decoder.decode_by_id(unit_ref)?;
            let prefix = unit.get(2).and_then(|v| v.as_enum()).unwrap_or("");
            get_si_prefix_multiplier(prefix)
        }
        None => 1.0,
    };

    Ok(Some(value * base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_si_prefix_multipliers() {
        assert_eq!(get_si_prefix_multiplier("MILLI"), 0.001);
        assert_eq!(get_si_prefix_multiplier("CENTI"), 0.01);
        assert_eq!(get_si_prefix_multiplier("KILO"), 1000.0);
        assert_eq!(get_si_prefix_multiplier(""), 1.0);
        assert_eq!(get_si_prefix_multiplier("UNKNOWN"), 1.0);
    }

    #[test]
    fn test_millimetre_project() {
        let content = "DATA;\n#1=IFCPROJECT('p',$,'P',$,$,$,$,$,#2);\n#2=IFCUNITASSIGNMENT((#3,#4));\n#3=IFCSIUNIT(*,.AREAUNIT.,$,.SQUARE_METRE.);\n#4=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);\nENDSEC;\n";
        let mut decoder = EntityDecoder::new(content);
        assert_eq!(length_unit_scale(&mut decoder).unwrap(), 0.001);
    }

    #[test]
    fn test_metre_project_without_prefix() {
        let content = "DATA;\n#1=IFCPROJECT('p',$,'P',$,$,$,$,$,#2);\n#2=IFCUNITASSIGNMENT((#3));\n#3=IFCSIUNIT(*,.LENGTHUNIT.,$,.METRE.);\nENDSEC;\n";
        let mut decoder = EntityDecoder::new(content);
        assert_eq!(length_unit_scale(&mut decoder).unwrap(), 1.0);
    }

    #[test]
    fn test_inch_project() {
        let content = "DATA;\n#1=IFCPROJECT('p',$,'P',$,$,$,$,$,#2);\n#2=IFCUNITASSIGNMENT((#3));\n#3=IFCCONVERSIONBASEDUNIT(#5,.LENGTHUNIT.,'INCH',#4);\n#4=IFCMEASUREWITHUNIT(IFCLENGTHMEASURE(25.4),#6);\n#5=IFCDIMENSIONALEXPONENTS(1,0,0,0,0,0,0);\n#6=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);\nENDSEC;\n";
        let mut decoder = EntityDecoder::new(content);
        let scale = length_unit_scale(&mut decoder).unwrap();
        assert!((scale - 0.0254).abs() < 1e-12);
    }

    #[test]
    fn test_no_project_defaults_to_metres() {
        let mut decoder = EntityDecoder::new("DATA;\n#1=IFCWALL('w',$,$,$,$,$,$,$);\n");
        assert_eq!(length_unit_scale(&mut decoder).unwrap(), 1.0);
    }
}
