// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement resolution
//!
//! Turns IfcLocalPlacement chains, IfcAxis2Placement frames and
//! IfcCartesianTransformationOperator3D into 4x4 matrices that map local
//! coordinates to the parent (ultimately world) frame.

use crate::error::{Error, Result};
use bim_showcase_core::{DecodedEntity, EntityDecoder, IfcType};
use nalgebra::{Matrix4, Point3, Vector3};

/// Guard against cyclic or absurdly deep PlacementRelTo chains
const MAX_PLACEMENT_DEPTH: usize = 100;

/// Parse IfcCartesianPoint referenced by an entity attribute
///
/// Attempts fast-path extraction first, falls back to full decode if needed.
pub fn parse_cartesian_point(
    parent: &DecodedEntity,
    decoder: &mut EntityDecoder,
    attr_index: usize,
) -> Result<Point3<f64>> {
    let point_id = parent
        .get_ref(attr_index)
        .ok_or_else(|| Error::geometry(format!("#{} missing cartesian point", parent.id)))?;
    parse_cartesian_point_from_id(point_id, decoder)
}

/// Parse IfcCartesianPoint by id
pub fn parse_cartesian_point_from_id(
    point_id: u32,
    decoder: &mut EntityDecoder,
) -> Result<Point3<f64>> {
    if let Some((x, y, z)) = decoder.get_cartesian_point_fast(point_id) {
        return Ok(Point3::new(x, y, z));
    }

    let point = decoder.decode_by_id(point_id)?;
    if point.ifc_type != IfcType::IfcCartesianPoint {
        return Err(Error::geometry(format!(
            "Expected IfcCartesianPoint, got {}",
            point.ifc_type
        )));
    }

    point
        .get(0)
        .and_then(|coords| coords.as_coordinates())
        .map(|(x, y, z)| Point3::new(x, y, z))
        .ok_or_else(|| Error::geometry(format!("#{} has no coordinates", point_id)))
}

/// Parse IfcDirection (2D directions get a zero Z)
pub fn parse_direction(direction: &DecodedEntity) -> Result<Vector3<f64>> {
    if direction.ifc_type != IfcType::IfcDirection {
        return Err(Error::geometry(format!(
            "Expected IfcDirection, got {}",
            direction.ifc_type
        )));
    }

    direction
        .get(0)
        .and_then(|ratios| ratios.as_coordinates())
        .map(|(x, y, z)| Vector3::new(x, y, z))
        .ok_or_else(|| Error::geometry(format!("#{} has no direction ratios", direction.id)))
}

/// Optional direction attribute with a default when absent
fn optional_direction(
    entity: &DecodedEntity,
    decoder: &mut EntityDecoder,
    attr_index: usize,
    default: Vector3<f64>,
) -> Result<Vector3<f64>> {
    match entity.get_ref(attr_index) {
        Some(id) => {
            let direction = decoder.decode_by_id(id)?;
            parse_direction(&direction)
        }
        None => Ok(default),
    }
}

/// Build a frame matrix from origin, Z axis and an X reference direction
///
/// The reference direction is projected onto the plane perpendicular to Z;
/// when the two are parallel a perpendicular fallback is used.
pub fn frame_matrix(
    location: Point3<f64>,
    axis: Vector3<f64>,
    ref_direction: Vector3<f64>,
) -> Matrix4<f64> {
    let z_axis = axis.try_normalize(1e-12).unwrap_or_else(Vector3::z);
    let x_ref = ref_direction.try_normalize(1e-12).unwrap_or_else(Vector3::x);

    let x_orthogonal = x_ref - z_axis * x_ref.dot(&z_axis);
    let x_axis = if x_orthogonal.norm() > 1e-6 {
        x_orthogonal.normalize()
    } else if z_axis.z.abs() < 0.9 {
        Vector3::z().cross(&z_axis).normalize()
    } else {
        Vector3::x().cross(&z_axis).normalize()
    };

    // Right-hand rule: Y = Z × X
    let y_axis = z_axis.cross(&x_axis).normalize();

    // Columns are the parent-space directions of the local axes
    let mut transform = Matrix4::identity();
    transform[(0, 0)] = x_axis.x;
    transform[(1, 0)] = x_axis.y;
    transform[(2, 0)] = x_axis.z;
    transform[(0, 1)] = y_axis.x;
    transform[(1, 1)] = y_axis.y;
    transform[(2, 1)] = y_axis.z;
    transform[(0, 2)] = z_axis.x;
    transform[(1, 2)] = z_axis.y;
    transform[(2, 2)] = z_axis.z;
    transform[(0, 3)] = location.x;
    transform[(1, 3)] = location.y;
    transform[(2, 3)] = location.z;
    transform
}

/// Parse IfcAxis2Placement3D into a transformation matrix
///
/// IfcAxis2Placement3D attributes:
/// - 0: Location (IfcCartesianPoint)
/// - 1: Axis (IfcDirection, optional, default +Z)
/// - 2: RefDirection (IfcDirection, optional, default +X)
pub fn parse_axis2_placement_3d(
    placement: &DecodedEntity,
    decoder: &mut EntityDecoder,
) -> Result<Matrix4<f64>> {
    let location = parse_cartesian_point(placement, decoder, 0)?;
    let axis = optional_direction(placement, decoder, 1, Vector3::z())?;
    let ref_direction = optional_direction(placement, decoder, 2, Vector3::x())?;
    Ok(frame_matrix(location, axis, ref_direction))
}

/// Parse IfcAxis2Placement2D (Location, RefDirection) as a frame in the XY plane
pub fn parse_axis2_placement_2d(
    placement: &DecodedEntity,
    decoder: &mut EntityDecoder,
) -> Result<Matrix4<f64>> {
    let location = parse_cartesian_point(placement, decoder, 0)?;
    let ref_direction = optional_direction(placement, decoder, 1, Vector3::x())?;
    Ok(frame_matrix(location, Vector3::z(), ref_direction))
}

/// Parse either axis placement flavour by id
pub fn parse_axis2_placement_from_id(
    placement_id: u32,
    decoder: &mut EntityDecoder,
) -> Result<Matrix4<f64>> {
    let placement = decoder.decode_by_id(placement_id)?;
    match placement.ifc_type {
        IfcType::IfcAxis2Placement3D => parse_axis2_placement_3d(&placement, decoder),
        IfcType::IfcAxis2Placement2D => parse_axis2_placement_2d(&placement, decoder),
        ref other => Err(Error::Unsupported(format!("placement {}", other))),
    }
}

/// Resolve an IfcLocalPlacement chain into a world transform
///
/// IfcLocalPlacement attributes:
/// - 0: PlacementRelTo (IfcObjectPlacement, optional)
/// - 1: RelativePlacement (IfcAxis2Placement)
pub fn resolve_local_placement(
    placement_id: u32,
    decoder: &mut EntityDecoder,
) -> Result<Matrix4<f64>> {
    let mut chain = Vec::new();
    let mut current = Some(placement_id);

    while let Some(id) = current {
        if chain.len() >= MAX_PLACEMENT_DEPTH {
            return Err(Error::TooDeep(MAX_PLACEMENT_DEPTH));
        }
        let placement = decoder.decode_by_id(id)?;
        if placement.ifc_type != IfcType::IfcLocalPlacement {
            // Grid placements and friends: treat as identity at this level
            tracing::debug!(id, ifc_type = %placement.ifc_type, "Unsupported object placement");
            break;
        }

        let relative = match placement.get_ref(1) {
            Some(axis_id) => parse_axis2_placement_from_id(axis_id, decoder)?,
            None => Matrix4::identity(),
        };
        chain.push(relative);
        current = placement.get_ref(0);
    }

    // Outermost placement applies last
    Ok(chain
        .iter()
        .rev()
        .fold(Matrix4::identity(), |world, local| world * local))
}

/// World transform of an IfcProduct (attribute 5: ObjectPlacement)
pub fn object_placement(
    product: &DecodedEntity,
    decoder: &mut EntityDecoder,
) -> Result<Matrix4<f64>> {
    match product.get_ref(5) {
        Some(placement_id) => resolve_local_placement(placement_id, decoder),
        None => Ok(Matrix4::identity()),
    }
}

/// Parse IfcCartesianTransformationOperator3D (and the non-uniform subtype)
///
/// Attributes:
/// - 0: Axis1 (X, optional)
/// - 1: Axis2 (Y, optional)
/// - 2: LocalOrigin
/// - 3: Scale (optional, default 1)
/// - 4: Axis3 (Z, optional)
/// - 5: Scale2, 6: Scale3 (non-uniform only, default Scale)
pub fn parse_transformation_operator(
    operator: &DecodedEntity,
    decoder: &mut EntityDecoder,
) -> Result<Matrix4<f64>> {
    let origin = parse_cartesian_point(operator, decoder, 2)?;
    let x_ref = optional_direction(operator, decoder, 0, Vector3::x())?;
    let z_axis = optional_direction(operator, decoder, 4, Vector3::z())?;

    let scale = operator.get_float(3).unwrap_or(1.0);
    let (scale_y, scale_z) = if operator.ifc_type == IfcType::IfcCartesianTransformationOperator3DnonUniform {
        (
            operator.get_float(5).unwrap_or(scale),
            operator.get_float(6).unwrap_or(scale),
        )
    } else {
        (scale, scale)
    };

    let frame = frame_matrix(origin, z_axis, x_ref);
    let scaling = Matrix4::new_nonuniform_scaling(&Vector3::new(scale, scale_y, scale_z));
    Ok(frame * scaling)
}
