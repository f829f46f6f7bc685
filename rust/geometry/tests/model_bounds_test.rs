// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model bounds for the door and window fixtures.

use approx::assert_relative_eq;
use bim_showcase_geometry::{extract_model_geometry, Point3, Vector3};

const DOOR: &str = include_str!("../../../tests/models/door_1100x2000.ifc");
const WINDOW: &str = include_str!("../../../tests/models/window_1400x1200.ifc");

#[test]
fn door_bounds_in_metres() {
    let geometry = extract_model_geometry(DOOR).unwrap();

    assert_relative_eq!(geometry.unit_scale, 0.001);
    assert_eq!(geometry.skipped, 0);
    // The opening element is not part of the visible model
    assert_eq!(geometry.elements.len(), 1);

    let door = geometry.element(100).unwrap();
    assert_eq!(door.ifc_type, "IfcDoor");
    assert_eq!(door.name.as_deref(), Some("S9000 Door 1100x2000"));
    assert_eq!(door.global_id.as_deref(), Some("3ZJ$g1ZuL2kf_kp2cgE2wW"));

    assert_relative_eq!(geometry.bounds.min, Point3::new(2.0, 0.0, 0.0), epsilon = 1e-9);
    assert_relative_eq!(geometry.bounds.size(), Vector3::new(1.1, 0.07, 2.0), epsilon = 1e-9);
}

#[test]
fn window_bounds_from_mapped_items() {
    let geometry = extract_model_geometry(WINDOW).unwrap();

    assert_eq!(geometry.elements.len(), 1);
    assert_relative_eq!(geometry.bounds.size(), Vector3::new(1.4, 0.08, 1.2), epsilon = 1e-9);
    assert_relative_eq!(geometry.bounds.min.z, 0.9, epsilon = 1e-9);
}

#[test]
fn file_without_products_has_empty_bounds() {
    let content = "ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\n#1=IFCCARTESIANPOINT((0.,0.,0.));\nENDSEC;\nEND-ISO-10303-21;\n";
    let geometry = extract_model_geometry(content).unwrap();
    assert!(geometry.elements.is_empty());
    assert!(geometry.bounds.is_empty());
    assert_eq!(geometry.unit_scale, 1.0);
}
