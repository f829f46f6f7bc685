// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-element and per-model bounds
//!
//! Bounds come straight from representation vertices (profile corners,
//! extrusion caps, face loops, point lists) without tessellating anything.
//! Curved profiles contribute their enclosing square, so boxes are
//! conservative for arcs and exact for polygonal geometry.

use crate::aabb::Aabb;
use crate::error::{Error, Result};
use crate::transform::{
    object_placement, parse_axis2_placement_from_id, parse_cartesian_point_from_id,
    parse_direction, parse_transformation_operator,
};
use bim_showcase_core::{
    build_entity_index, length_unit_scale, DecodedEntity, EntityDecoder, EntityIndex, EntityScanner,
    IfcType,
};
use nalgebra::{Matrix4, Point3, Vector3};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Representation items nest through mapped items and boolean operands
const MAX_ITEM_DEPTH: usize = 32;

/// Representation identifiers that describe the physical body
const BODY_IDENTIFIERS: [&str; 2] = ["Body", "Facetation"];

/// World-space bounds of one product, in metres
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBounds {
    pub express_id: u32,
    pub ifc_type: String,
    pub global_id: Option<String>,
    pub name: Option<String>,
    pub bounds: Aabb,
}

/// Bounds of every product with a supported body representation
#[derive(Debug, Clone)]
pub struct ModelGeometry {
    pub elements: Vec<ElementBounds>,
    /// Union of all element bounds, in metres
    pub bounds: Aabb,
    /// File length unit in metres
    pub unit_scale: f64,
    /// Products whose representation could not be bounded
    pub skipped: usize,
}

impl ModelGeometry {
    pub fn element(&self, express_id: u32) -> Option<&ElementBounds> {
        self.elements.iter().find(|e| e.express_id == express_id)
    }
}

struct ProductJob {
    id: u32,
    start: usize,
    end: usize,
}

/// Extract per-element bounds for the whole file
pub fn extract_model_geometry(content: &str) -> Result<ModelGeometry> {
    extract_model_geometry_indexed(content, Arc::new(build_entity_index(content)))
}

/// Same as [`extract_model_geometry`] over a pre-built entity index
///
/// Elements are processed in parallel, each rayon task with its own decoder
/// over the shared index.
pub fn extract_model_geometry_indexed(
    content: &str,
    entity_index: Arc<EntityIndex>,
) -> Result<ModelGeometry> {
    let mut decoder = EntityDecoder::with_arc_index(content, Arc::clone(&entity_index));
    let unit_scale = length_unit_scale(&mut decoder)?;

    let mut shapes = FxHashSet::default();
    let mut jobs = Vec::new();
    let mut scanner = EntityScanner::new(content);
    while let Some((id, type_name, start, end)) = scanner.next_entity() {
        let ifc_type = IfcType::from_name(type_name);
        if ifc_type == IfcType::IfcProductDefinitionShape {
            shapes.insert(id);
        } else if is_product_candidate(&ifc_type) {
            jobs.push(ProductJob { id, start, end });
        }
    }

    tracing::debug!(
        candidates = jobs.len(),
        shapes = shapes.len(),
        unit_scale,
        "Scanned product candidates"
    );

    let outcomes: Vec<Option<Result<ElementBounds>>> = jobs
        .into_par_iter()
        .map(|job| {
            let mut local_decoder = EntityDecoder::with_arc_index(content, Arc::clone(&entity_index));
            let entity = match local_decoder.decode_at(job.start, job.end) {
                Ok(entity) => entity,
                Err(e) => return Some(Err(e.into())),
            };
            // Attribute 6: Representation
            let shape_id = entity.get_ref(6).filter(|id| shapes.contains(id))?;
            Some(element_bounds(&entity, shape_id, &mut local_decoder, unit_scale).map_err(|e| {
                tracing::warn!(
                    id = job.id,
                    ifc_type = %entity.ifc_type,
                    error = %e,
                    "Skipping element bounds"
                );
                e
            }))
        })
        .collect();

    let mut elements = Vec::new();
    let mut skipped = 0;
    for outcome in outcomes.into_iter().flatten() {
        match outcome {
            Ok(element) => elements.push(element),
            Err(_) => skipped += 1,
        }
    }
    elements.sort_by_key(|e| e.express_id);

    let bounds = elements
        .iter()
        .fold(Aabb::empty(), |acc, e| acc.union(&e.bounds));

    tracing::info!(
        elements = elements.len(),
        skipped,
        size_x = bounds.size().x,
        size_y = bounds.size().y,
        size_z = bounds.size().z,
        "Model bounds extracted"
    );

    Ok(ModelGeometry {
        elements,
        bounds,
        unit_scale,
        skipped,
    })
}

/// Entities worth decoding to look for a product shape
fn is_product_candidate(ifc_type: &IfcType) -> bool {
    match ifc_type {
        IfcType::IfcDoor | IfcType::IfcWindow => true,
        IfcType::Other(name) => name != "IFCOPENINGELEMENT" && !name.starts_with("IFCREL"),
        _ => false,
    }
}

/// World bounds of one product in metres
pub fn element_bounds(
    product: &DecodedEntity,
    shape_id: u32,
    decoder: &mut EntityDecoder,
    unit_scale: f64,
) -> Result<ElementBounds> {
    let placement = object_placement(product, decoder)?;
    let local = shape_bounds(shape_id, decoder)?;
    if local.is_empty() {
        return Err(Error::geometry("no supported body geometry"));
    }

    let to_metres = Matrix4::new_scaling(unit_scale);
    Ok(ElementBounds {
        express_id: product.id,
        ifc_type: product.ifc_type.display_name(),
        global_id: product.get_string(0).map(str::to_string),
        name: product.get_string(2).map(str::to_string),
        bounds: local.transformed(&(to_metres * placement)),
    })
}

/// IfcProductDefinitionShape: Name, Description, Representations
///
/// Body representations win; without any, every representation except the
/// axis line counts.
fn shape_bounds(shape_id: u32, decoder: &mut EntityDecoder) -> Result<Aabb> {
    let shape = decoder.decode_by_id(shape_id)?;
    let mut body = Vec::new();
    let mut other = Vec::new();

    for rep_id in shape.get_refs(2) {
        let rep = decoder.decode_by_id(rep_id)?;
        if rep.ifc_type != IfcType::IfcShapeRepresentation {
            continue;
        }
        match rep.get_string(1) {
            Some(identifier) if BODY_IDENTIFIERS.contains(&identifier) => body.push(rep),
            Some("Axis") => {}
            _ => other.push(rep),
        }
    }

    let chosen = if body.is_empty() { other } else { body };
    let mut bounds = Aabb::empty();
    for rep in chosen {
        bounds = bounds.union(&representation_bounds(&rep, decoder, 0)?);
    }
    Ok(bounds)
}

/// IfcShapeRepresentation: ContextOfItems, Identifier, Type, Items
fn representation_bounds(
    rep: &DecodedEntity,
    decoder: &mut EntityDecoder,
    depth: usize,
) -> Result<Aabb> {
    let mut bounds = Aabb::empty();
    for item_id in rep.get_refs(3) {
        match item_bounds(item_id, decoder, depth) {
            Ok(item) => bounds = bounds.union(&item),
            Err(Error::Unsupported(kind)) => {
                tracing::debug!(item = item_id, kind = %kind, "Unsupported representation item");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(bounds)
}

/// Bounds of one representation item in its own coordinate system
pub fn item_bounds(item_id: u32, decoder: &mut EntityDecoder, depth: usize) -> Result<Aabb> {
    if depth > MAX_ITEM_DEPTH {
        return Err(Error::TooDeep(MAX_ITEM_DEPTH));
    }
    let item = decoder.decode_by_id(item_id)?;

    match item.ifc_type {
        IfcType::IfcExtrudedAreaSolid => extruded_area_bounds(&item, decoder),
        IfcType::IfcFacetedBrep => {
            let shell = item
                .get_ref(0)
                .ok_or_else(|| Error::geometry("IfcFacetedBrep without outer shell"))?;
            shell_bounds(shell, decoder)
        }
        IfcType::IfcShellBasedSurfaceModel => {
            let mut bounds = Aabb::empty();
            for shell in item.get_refs(0) {
                bounds = bounds.union(&shell_bounds(shell, decoder)?);
            }
            Ok(bounds)
        }
        IfcType::IfcTriangulatedFaceSet | IfcType::IfcPolygonalFaceSet => {
            let list = item
                .get_ref(0)
                .ok_or_else(|| Error::geometry("face set without coordinates"))?;
            Ok(Aabb::from_points(point_list(list, decoder)?.iter()))
        }
        IfcType::IfcMappedItem => mapped_item_bounds(&item, decoder, depth),
        IfcType::IfcBooleanResult | IfcType::IfcBooleanClippingResult => {
            boolean_bounds(&item, decoder, depth)
        }
        ref other => Err(Error::Unsupported(other.display_name())),
    }
}

/// IfcExtrudedAreaSolid: SweptArea, Position, ExtrudedDirection, Depth
fn extruded_area_bounds(solid: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Aabb> {
    let profile_id = solid
        .get_ref(0)
        .ok_or_else(|| Error::geometry("extrusion without swept area"))?;
    let profile = profile_points(profile_id, decoder)?;

    let direction = match solid.get_ref(2) {
        Some(id) => {
            let direction = decoder.decode_by_id(id)?;
            parse_direction(&direction)?
        }
        None => Vector3::z(),
    };
    let depth = solid
        .get_float(3)
        .ok_or_else(|| Error::geometry("extrusion without depth"))?;
    let sweep = direction.try_normalize(1e-12).unwrap_or_else(Vector3::z) * depth;

    let position = match solid.get_ref(1) {
        Some(id) => parse_axis2_placement_from_id(id, decoder)?,
        None => Matrix4::identity(),
    };

    let mut bounds = Aabb::empty();
    for point in &profile {
        bounds.expand(point);
        bounds.expand(&(*point + sweep));
    }
    Ok(bounds.transformed(&position))
}

/// Corner points of a profile in the solid's XY plane
fn profile_points(profile_id: u32, decoder: &mut EntityDecoder) -> Result<Vec<Point3<f64>>> {
    let profile = decoder.decode_by_id(profile_id)?;

    let points = match profile.ifc_type {
        // ProfileType, ProfileName, Position, XDim, YDim
        IfcType::IfcRectangleProfileDef => {
            let half_x = profile.get_float(3).unwrap_or(0.0) / 2.0;
            let half_y = profile.get_float(4).unwrap_or(0.0) / 2.0;
            vec![
                Point3::new(-half_x, -half_y, 0.0),
                Point3::new(half_x, -half_y, 0.0),
                Point3::new(half_x, half_y, 0.0),
                Point3::new(-half_x, half_y, 0.0),
            ]
        }
        // ProfileType, ProfileName, Position, Radius
        IfcType::IfcCircleProfileDef => {
            let r = profile.get_float(3).unwrap_or(0.0);
            vec![Point3::new(-r, -r, 0.0), Point3::new(r, r, 0.0)]
        }
        // ProfileType, ProfileName, OuterCurve[, InnerCurves]
        IfcType::IfcArbitraryClosedProfileDef | IfcType::IfcArbitraryProfileDefWithVoids => {
            let curve = profile
                .get_ref(2)
                .ok_or_else(|| Error::geometry("profile without outer curve"))?;
            return curve_points(curve, decoder);
        }
        ref other => return Err(Error::Unsupported(other.display_name())),
    };

    // Parameterized profiles sit in their own 2D position
    match profile.get_ref(2) {
        Some(position_id) => {
            let position = parse_axis2_placement_from_id(position_id, decoder)?;
            Ok(points.iter().map(|p| position.transform_point(p)).collect())
        }
        None => Ok(points),
    }
}

fn curve_points(curve_id: u32, decoder: &mut EntityDecoder) -> Result<Vec<Point3<f64>>> {
    let curve = decoder.decode_by_id(curve_id)?;
    match curve.ifc_type {
        IfcType::IfcPolyline => curve
            .get_refs(0)
            .into_iter()
            .map(|id| parse_cartesian_point_from_id(id, decoder))
            .collect(),
        IfcType::IfcIndexedPolyCurve => {
            let list = curve
                .get_ref(0)
                .ok_or_else(|| Error::geometry("indexed curve without points"))?;
            point_list(list, decoder)
        }
        ref other => Err(Error::Unsupported(other.display_name())),
    }
}

/// IfcCartesianPointList2D/3D: CoordList
fn point_list(list_id: u32, decoder: &mut EntityDecoder) -> Result<Vec<Point3<f64>>> {
    let list = decoder.decode_by_id(list_id)?;
    let coords = list
        .get_list(0)
        .ok_or_else(|| Error::geometry(format!("#{} has no coordinate list", list_id)))?;
    Ok(coords
        .iter()
        .filter_map(|c| c.as_coordinates())
        .map(|(x, y, z)| Point3::new(x, y, z))
        .collect())
}

/// IfcClosedShell/IfcOpenShell → IfcFace → IfcFaceBound → IfcPolyLoop
fn shell_bounds(shell_id: u32, decoder: &mut EntityDecoder) -> Result<Aabb> {
    let shell = decoder.decode_by_id(shell_id)?;
    let mut bounds = Aabb::empty();

    for face_id in shell.get_refs(0) {
        let face = decoder.decode_by_id(face_id)?;
        for bound_id in face.get_refs(0) {
            let bound = decoder.decode_by_id(bound_id)?;
            let Some(loop_id) = bound.get_ref(0) else {
                continue;
            };
            let poly_loop = decoder.decode_by_id(loop_id)?;
            if poly_loop.ifc_type != IfcType::IfcPolyLoop {
                continue;
            }
            for point_id in poly_loop.get_refs(0) {
                bounds.expand(&parse_cartesian_point_from_id(point_id, decoder)?);
            }
        }
    }

    Ok(bounds)
}

/// IfcMappedItem: MappingSource (IfcRepresentationMap), MappingTarget
///
/// The mapped representation lives in the map's origin frame, which the
/// target operator then places.
fn mapped_item_bounds(
    item: &DecodedEntity,
    decoder: &mut EntityDecoder,
    depth: usize,
) -> Result<Aabb> {
    let map_id = item
        .get_ref(0)
        .ok_or_else(|| Error::geometry("mapped item without source"))?;
    let map = decoder.decode_by_id(map_id)?;

    let origin = match map.get_ref(0) {
        Some(id) => parse_axis2_placement_from_id(id, decoder)?,
        None => Matrix4::identity(),
    };
    let target = match item.get_ref(1) {
        Some(id) => {
            let operator = decoder.decode_by_id(id)?;
            parse_transformation_operator(&operator, decoder)?
        }
        None => Matrix4::identity(),
    };

    let rep_id = map
        .get_ref(1)
        .ok_or_else(|| Error::geometry("representation map without representation"))?;
    let rep = decoder.decode_by_id(rep_id)?;
    let local = representation_bounds(&rep, decoder, depth + 1)?;
    Ok(local.transformed(&(target * origin)))
}

/// IfcBooleanResult: Operator, FirstOperand, SecondOperand
///
/// Differences and intersections never grow the first operand, so its box
/// is kept; unions add the second operand when it can be bounded.
fn boolean_bounds(item: &DecodedEntity, decoder: &mut EntityDecoder, depth: usize) -> Result<Aabb> {
    let first = item
        .get_ref(1)
        .ok_or_else(|| Error::geometry("boolean result without first operand"))?;
    let bounds = item_bounds(first, decoder, depth + 1)?;

    if item.get(0).and_then(|v| v.as_enum()) != Some("UNION") {
        return Ok(bounds);
    }
    match item.get_ref(2).map(|second| item_bounds(second, decoder, depth + 1)) {
        Some(Ok(second)) => Ok(bounds.union(&second)),
        Some(Err(e)) => {
            tracing::debug!(id = item.id, error = %e, "Ignoring unbounded union operand");
            Ok(bounds)
        }
        None => Ok(bounds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn decoder(content: &str) -> EntityDecoder<'_> {
        EntityDecoder::new(content)
    }

    const ITEMS: &str = "DATA;
#1=IFCCARTESIANPOINT((0.,0.,0.));
#2=IFCAXIS2PLACEMENT2D(#1,$);
#3=IFCRECTANGLEPROFILEDEF(.AREA.,$,#2,100.,50.);
#4=IFCAXIS2PLACEMENT3D(#1,$,$);
#5=IFCDIRECTION((0.,0.,1.));
#6=IFCEXTRUDEDAREASOLID(#3,#4,#5,2000.);
#10=IFCCARTESIANPOINT((0.,0.,0.));
#11=IFCCARTESIANPOINT((1.,0.,0.));
#12=IFCCARTESIANPOINT((1.,2.,0.));
#13=IFCCARTESIANPOINT((0.,2.,3.));
#14=IFCPOLYLOOP((#10,#11,#12,#13));
#15=IFCFACEOUTERBOUND(#14,.T.);
#16=IFCFACE((#15));
#17=IFCCLOSEDSHELL((#16));
#18=IFCFACETEDBREP(#17);
#20=IFCCARTESIANPOINTLIST3D(((0.,0.,0.),(4.,0.,0.),(0.,5.,6.)));
#21=IFCTRIANGULATEDFACESET(#20,$,$,((1,2,3)),$);
#30=IFCSHAPEREPRESENTATION($,'Body','SweptSolid',(#6));
#31=IFCREPRESENTATIONMAP(#4,#30);
#32=IFCCARTESIANPOINT((10.,0.,0.));
#33=IFCCARTESIANTRANSFORMATIONOPERATOR3D($,$,#32,1.,$);
#34=IFCMAPPEDITEM(#31,#33);
#40=IFCBOOLEANCLIPPINGRESULT(.DIFFERENCE.,#6,#99);
#41=IFCBOOLEANRESULT(.UNION.,#6,#18);
#50=IFCCIRCLEPROFILEDEF(.AREA.,$,$,0.5);
#51=IFCEXTRUDEDAREASOLID(#50,$,#5,1.);
#60=IFCBLOCK(#4,1.,1.,1.);
#70=IFCDIRECTION((1.,0.,1.));
#71=IFCEXTRUDEDAREASOLID(#3,#4,#70,2000.);
ENDSEC;
";

    #[test]
    fn test_rectangle_extrusion() {
        let mut d = decoder(ITEMS);
        let b = item_bounds(6, &mut d, 0).unwrap();
        assert_relative_eq!(b.min, Point3::new(-50.0, -25.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(b.max, Point3::new(50.0, 25.0, 2000.0), epsilon = 1e-9);
    }

    #[test]
    fn test_slanted_extrusion_follows_direction() {
        let mut d = decoder(ITEMS);
        let b = item_bounds(71, &mut d, 0).unwrap();
        let run = 2000.0 / 2f64.sqrt();
        assert_relative_eq!(b.min, Point3::new(-50.0, -25.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(b.max, Point3::new(50.0 + run, 25.0, run), epsilon = 1e-9);
    }

    #[test]
    fn test_circle_extrusion_uses_enclosing_square() {
        let mut d = decoder(ITEMS);
        let b = item_bounds(51, &mut d, 0).unwrap();
        assert_relative_eq!(b.size(), Vector3::new(1.0, 1.0, 1.0), epsilon = 1e-9);
    }

    #[test]
    fn test_faceted_brep() {
        let mut d = decoder(ITEMS);
        let b = item_bounds(18, &mut d, 0).unwrap();
        assert_eq!(b.max, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_triangulated_face_set() {
        let mut d = decoder(ITEMS);
        let b = item_bounds(21, &mut d, 0).unwrap();
        assert_eq!(b.size(), Vector3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_mapped_item_applies_target() {
        let mut d = decoder(ITEMS);
        let b = item_bounds(34, &mut d, 0).unwrap();
        assert_relative_eq!(b.min.x, -40.0, epsilon = 1e-9);
        assert_relative_eq!(b.max.x, 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_boolean_results() {
        let mut d = decoder(ITEMS);
        // Missing second operand does not matter for a difference
        let clipped = item_bounds(40, &mut d, 0).unwrap();
        assert_relative_eq!(clipped.max.z, 2000.0, epsilon = 1e-9);

        let union = item_bounds(41, &mut d, 0).unwrap();
        assert_relative_eq!(union.min.x, -50.0, epsilon = 1e-9);
        assert_relative_eq!(union.max.z, 2000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unsupported_item() {
        let mut d = decoder(ITEMS);
        assert!(matches!(item_bounds(60, &mut d, 0), Err(Error::Unsupported(_))));
    }
}
