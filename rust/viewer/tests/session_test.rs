// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end session behaviour: load, rescale, reset, drag, views and
//! properties against the door and window fixtures.

use approx::assert_relative_eq;
use bim_showcase_viewer::{
    Dimension, DimensionError, Dimensions, IfcImporter, LoadedModel, ModelSource, Result, ViewKind,
    ViewerError, ViewerSession, DEMO_CATALOG,
};
use nalgebra::Vector3;
use std::collections::HashMap;

const DOOR_FILE: &str = "GEALAN_S9000_Door_1100x2000-IFC4.ifc";
const WINDOW_FILE: &str = "GEALAN_S9000_Double_Vent_Window_1400x1200-IFC4.ifc";

const FLAT_SHEET: &str = "ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#1=IFCCARTESIANPOINT((0.,0.,0.));
#2=IFCCARTESIANPOINT((1.,0.,0.));
#3=IFCCARTESIANPOINT((1.,0.,2.));
#4=IFCPOLYLOOP((#1,#2,#3));
#5=IFCFACEOUTERBOUND(#4,.T.);
#6=IFCFACE((#5));
#7=IFCOPENSHELL((#6));
#8=IFCSHELLBASEDSURFACEMODEL((#7));
#9=IFCSHAPEREPRESENTATION($,'Body','SurfaceModel',(#8));
#10=IFCPRODUCTDEFINITIONSHAPE($,$,(#9));
#11=IFCPLATE('2O2Fr$t4X7Zf8NOew3FLOH',$,'Sheet',$,$,$,#10,$,$);
ENDSEC;
END-ISO-10303-21;
";

/// In-memory stand-in for the objects directory
struct MemorySource(HashMap<&'static str, &'static str>);

impl MemorySource {
    fn demo() -> Self {
        let mut files = HashMap::new();
        files.insert(DOOR_FILE, include_str!("../../../tests/models/door_1100x2000.ifc"));
        files.insert(WINDOW_FILE, include_str!("../../../tests/models/window_1400x1200.ifc"));
        files.insert("flat_sheet.ifc", FLAT_SHEET);
        files.insert("broken.ifc", "this is not a STEP file");
        Self(files)
    }
}

impl ModelSource for MemorySource {
    fn fetch(&self, file_name: &str) -> Result<Vec<u8>> {
        self.0
            .get(file_name)
            .map(|content| content.as_bytes().to_vec())
            .ok_or_else(|| ViewerError::NotFound(file_name.to_string()))
    }
}

fn load(session: &mut ViewerSession, file: &str) -> Result<LoadedModel> {
    session.load(&MemorySource::demo(), &IfcImporter::new(), file)
}

#[test]
fn catalog_files_load() {
    let source = MemorySource::demo();
    for entry in DEMO_CATALOG {
        let mut session = ViewerSession::new();
        let loaded = session
            .load(&source, &IfcImporter::new(), entry.file_name)
            .unwrap();
        assert_eq!(loaded.element_count, 1);
        assert_eq!(session.fragments().len(), 1);
    }
}

#[test]
fn door_load_captures_original_dimensions() {
    let mut session = ViewerSession::new();
    let loaded = load(&mut session, DOOR_FILE).unwrap();

    assert_eq!(loaded.model_id, "GEALAN_S9000_Door_1100x2000-IFC4");
    assert_eq!(loaded.original, Dimensions::new(1.1, 2.0, 0.07));
    assert_eq!(session.target_dimensions(), Some(loaded.original));
    assert_eq!(session.original_scale(), Some(Vector3::new(1.0, 1.0, 1.0)));
    assert_eq!(
        session.status_line().unwrap(),
        "Loaded: GEALAN_S9000_Door_1100x2000-IFC4 | W: 1.10m × H: 2.00m × D: 0.07m"
    );
    assert!(session.loading().is_none());

    // Camera looks at the bounds center from 1.5 × the largest dimension
    let camera = &session.world().camera;
    let center = loaded.bounds.center();
    assert_relative_eq!(camera.target, center, epsilon = 1e-9);
    assert_relative_eq!(camera.position.x - center.x, 3.0, epsilon = 1e-9);
}

#[test]
fn apply_scales_width_only_and_is_idempotent() {
    let mut session = ViewerSession::new();
    load(&mut session, DOOR_FILE).unwrap();
    let updates = session.fragments().update_count();

    session
        .set_target_dimensions(Dimensions::new(2.2, 2.0, 0.07))
        .unwrap();
    let factors = session.apply_dimensions().unwrap();
    assert_relative_eq!(factors.x, 2.0, epsilon = 1e-12);
    assert_eq!((factors.y, factors.z), (1.0, 1.0));
    assert_eq!(session.fragments().update_count(), updates + 1);

    let once = session.model_scale().unwrap();
    session.apply_dimensions().unwrap();
    assert_eq!(session.model_scale().unwrap(), once);

    let size = session.model_bounds().unwrap().size();
    assert_relative_eq!(size, Vector3::new(2.2, 0.07, 2.0), epsilon = 1e-9);
    assert_eq!(
        session.status_line().unwrap(),
        "Loaded: GEALAN_S9000_Door_1100x2000-IFC4 | W: 2.20m × H: 2.00m × D: 0.07m"
    );
}

#[test]
fn reset_restores_scale_and_target() {
    let mut session = ViewerSession::new();
    let loaded = load(&mut session, WINDOW_FILE).unwrap();
    let baseline = session.original_scale().unwrap();

    for target in [
        Dimensions::new(2.8, 1.2, 0.08),
        Dimensions::new(0.7, 3.3, 0.2),
    ] {
        session.set_target_dimensions(target).unwrap();
        session.apply_dimensions().unwrap();
    }
    let restored = session.reset_dimensions().unwrap();

    assert_eq!(restored, loaded.original);
    assert_eq!(session.target_dimensions(), Some(loaded.original));
    let scale = session.model_scale().unwrap();
    assert_eq!(scale.x.to_bits(), baseline.x.to_bits());
    assert_eq!(scale.y.to_bits(), baseline.y.to_bits());
    assert_eq!(scale.z.to_bits(), baseline.z.to_bits());
}

#[test]
fn degenerate_model_rejects_rescale_without_touching_transform() {
    let mut session = ViewerSession::new();
    let loaded = load(&mut session, "flat_sheet.ifc").unwrap();
    assert_eq!(loaded.original.depth, 0.0);

    let updates = session.fragments().update_count();
    let before = session.model_scale().unwrap();

    session
        .set_target_dimensions(Dimensions::new(2.0, 2.0, 0.1))
        .unwrap();
    let err = session.apply_dimensions().unwrap_err();
    assert!(matches!(
        err,
        ViewerError::Dimension(DimensionError::DegenerateOriginal {
            axis: Dimension::Depth,
            ..
        })
    ));
    assert_eq!(session.model_scale().unwrap(), before);
    assert_eq!(session.fragments().update_count(), updates);
}

#[test]
fn invalid_target_is_rejected() {
    let mut session = ViewerSession::new();
    load(&mut session, DOOR_FILE).unwrap();
    session
        .set_target_dimensions(Dimensions::new(-1.0, 2.0, 0.07))
        .unwrap();
    assert!(matches!(
        session.apply_dimensions(),
        Err(ViewerError::Dimension(DimensionError::InvalidTarget { .. }))
    ));
    assert_eq!(session.model_scale(), Some(Vector3::new(1.0, 1.0, 1.0)));
}

#[test]
fn editing_without_model_fails() {
    let mut session = ViewerSession::new();
    assert!(matches!(session.apply_dimensions(), Err(ViewerError::NoModelLoaded)));
    assert!(matches!(session.reset_dimensions(), Err(ViewerError::NoModelLoaded)));
    assert!(matches!(
        session.set_target_dimensions(Dimensions::new(1.0, 1.0, 1.0)),
        Err(ViewerError::NoModelLoaded)
    ));
    assert!(session.status_line().is_none());
    assert!(matches!(session.views(), Err(ViewerError::NoModelLoaded)));
}

#[test]
fn newer_load_supersedes_older_one() {
    let mut session = ViewerSession::new();
    let importer = IfcImporter::new();
    let source = MemorySource::demo();
    let convert = |file: &str| importer.process(&source.fetch(file)?, |_, _| {});

    let door = session.begin_load(DOOR_FILE).unwrap();
    let window = session.begin_load(WINDOW_FILE).unwrap();
    assert_eq!(session.loading(), Some(WINDOW_FILE));

    let stale = session.finish_load(door, convert(DOOR_FILE));
    assert!(matches!(stale, Err(ViewerError::Superseded { .. })));
    assert_eq!(session.loading(), Some(WINDOW_FILE));

    let ticket = window.clone();
    let loaded = session.finish_load(window, convert(WINDOW_FILE)).unwrap();
    assert_eq!(loaded.original, Dimensions::new(1.4, 1.2, 0.08));
    assert_eq!(session.fragments().ids(), vec!["GEALAN_S9000_Double_Vent_Window_1400x1200-IFC4"]);

    // A ticket is honoured once
    assert!(matches!(
        session.finish_load(ticket, convert(WINDOW_FILE)),
        Err(ViewerError::Superseded { .. })
    ));
}

#[test]
fn abandoned_load_clears_loading_state() {
    let mut session = ViewerSession::new();
    let importer = IfcImporter::new();
    let source = MemorySource::demo();

    let door = session.begin_load(DOOR_FILE).unwrap();
    assert_eq!(session.loading(), Some(DOOR_FILE));
    assert!(session.abandon_load(&door));
    assert!(session.loading().is_none());
    assert!(session.model_id().is_none());

    // The abandoned ticket can no longer install its result
    let result = importer.process(&source.fetch(DOOR_FILE).unwrap(), |_, _| {});
    assert!(matches!(
        session.finish_load(door, result),
        Err(ViewerError::Superseded { .. })
    ));

    // Abandoning a superseded ticket leaves the newer load running
    let door = session.begin_load(DOOR_FILE).unwrap();
    let window = session.begin_load(WINDOW_FILE).unwrap();
    assert!(!session.abandon_load(&door));
    assert_eq!(session.loading(), Some(WINDOW_FILE));

    let result = importer.process(&source.fetch(WINDOW_FILE).unwrap(), |_, _| {});
    session.finish_load(window.clone(), result).unwrap();
    assert!(!session.abandon_load(&window));
    assert!(session.model_id().is_some());
}

#[test]
fn reload_replaces_previous_model() {
    let mut session = ViewerSession::new();
    load(&mut session, DOOR_FILE).unwrap();
    load(&mut session, WINDOW_FILE).unwrap();

    assert_eq!(session.fragments().len(), 1);
    assert_eq!(session.model_id(), Some("GEALAN_S9000_Double_Vent_Window_1400x1200-IFC4"));
    // Model object plus its drag helper
    assert_eq!(session.world().scene.len(), 2);
}

#[test]
fn failed_load_leaves_no_model() {
    let mut session = ViewerSession::new();
    load(&mut session, DOOR_FILE).unwrap();

    assert!(matches!(
        load(&mut session, "missing.ifc"),
        Err(ViewerError::NotFound(_))
    ));
    assert!(session.model().is_none());
    assert!(session.loading().is_none());
    assert!(session.world().scene.is_empty());

    assert!(matches!(load(&mut session, "broken.ifc"), Err(ViewerError::Ifc(_))));
    assert!(matches!(
        load(&mut session, "../etc/passwd.ifc"),
        Err(ViewerError::InvalidFileName(_))
    ));
}

#[test]
fn drag_moves_model_and_toggles_camera_controls() {
    let mut session = ViewerSession::new();
    load(&mut session, DOOR_FILE).unwrap();
    let before = session.model_bounds().unwrap();

    session.start_drag().unwrap();
    assert!(!session.world().camera.controls_enabled());

    let center = before.center();
    let moved = session
        .drag_to(Vector3::new(center.x + 1.0, center.y + 5.0, center.z + 3.0))
        .unwrap();
    assert_relative_eq!(moved, Vector3::new(1.0, 5.0, 0.0), epsilon = 1e-9);

    session.end_drag().unwrap();
    assert!(session.world().camera.controls_enabled());

    let after = session.model_bounds().unwrap();
    assert_relative_eq!(after.min.x - before.min.x, 1.0, epsilon = 1e-9);
    assert_relative_eq!(after.min.y - before.min.y, 5.0, epsilon = 1e-9);
    assert_relative_eq!(after.min.z, before.min.z, epsilon = 1e-9);
}

#[test]
fn views_cover_storeys_and_elevations() {
    let mut session = ViewerSession::new();
    load(&mut session, WINDOW_FILE).unwrap();

    let views = session.views().unwrap();
    assert_eq!(views.len(), 5);
    match &views[0].kind {
        ViewKind::FloorPlan { elevation, .. } => assert_relative_eq!(*elevation, 0.9, epsilon = 1e-12),
        other => panic!("expected a floor plan, got {:?}", other),
    }
    assert_eq!(views[0].name, "Level 1");
    assert!(views[1..]
        .iter()
        .all(|v| matches!(v.kind, ViewKind::Elevation(_))));
}

#[test]
fn element_properties_search_and_export() {
    let mut session = ViewerSession::new();
    load(&mut session, DOOR_FILE).unwrap();

    let properties = session.select(100).unwrap();
    assert_eq!(properties.name.as_deref(), Some("S9000 Door 1100x2000"));
    assert_eq!(session.selection().selected_id(), Some(100));

    let filtered = session.selection().table(Some("THERMAL")).unwrap();
    assert_eq!(filtered.groups.len(), 1);
    assert_eq!(filtered.groups[0].properties.len(), 1);

    let tsv = session.selection().export_tsv().unwrap();
    assert!(tsv.contains("Pset_DoorCommon\tFireRating\tEI30"));

    assert!(matches!(session.select(424242), Err(ViewerError::UnknownElement(424242))));
    session.clear_selection();
    assert!(session.selection().table(None).is_none());
}

#[test]
fn lighting_is_clamped() {
    let mut session = ViewerSession::new();
    session.set_lighting(Some(-1.0), Some(0.4));
    assert_eq!(session.world().lighting.directional(), 0.0);
    assert_eq!(session.world().lighting.ambient(), 0.4);
}
