// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D view definitions: floor plans per storey and four elevations.
//!
//! A view is an orthographic camera: where it stands, what it looks at,
//! which way is up, and the extent of the frustum.

use bim_showcase_geometry::Aabb;
use nalgebra::{Point3, Vector3};

/// Height of the plan cut above the storey elevation, metres
pub const PLAN_CUT_HEIGHT: f64 = 1.5;

/// Clearance between an elevation camera and the model bounds, metres
const ELEVATION_CLEARANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    North,
    South,
    East,
    West,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::North, Facing::South, Facing::East, Facing::West];

    pub fn name(&self) -> &'static str {
        match self {
            Facing::North => "North",
            Facing::South => "South",
            Facing::East => "East",
            Facing::West => "West",
        }
    }

    /// Outward direction of the facade this elevation shows (+Y is north)
    fn outward(&self) -> Vector3<f64> {
        match self {
            Facing::North => Vector3::y(),
            Facing::South => -Vector3::y(),
            Facing::East => Vector3::x(),
            Facing::West => -Vector3::x(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewKind {
    FloorPlan { storey_id: u32, elevation: f64 },
    Elevation(Facing),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewDefinition {
    pub id: String,
    pub name: String,
    pub kind: ViewKind,
    pub position: Point3<f64>,
    pub target: Point3<f64>,
    pub up: Vector3<f64>,
    /// Orthographic frustum width and height
    pub width: f64,
    pub height: f64,
}

/// Storey placed in world space
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedStorey {
    pub id: u32,
    pub name: String,
    /// World Z of the storey floor, metres
    pub elevation: f64,
}

/// One plan per storey, looking down from the cut height
pub fn floor_plans(storeys: &[PlacedStorey], bounds: &Aabb) -> Vec<ViewDefinition> {
    let center = bounds.center();
    let size = bounds.size();

    storeys
        .iter()
        .map(|storey| {
            let cut = storey.elevation + PLAN_CUT_HEIGHT;
            ViewDefinition {
                id: format!("plan-{}", storey.id),
                name: storey.name.clone(),
                kind: ViewKind::FloorPlan {
                    storey_id: storey.id,
                    elevation: storey.elevation,
                },
                position: Point3::new(center.x, center.y, cut),
                target: Point3::new(center.x, center.y, storey.elevation),
                up: Vector3::y(),
                width: size.x,
                height: size.y,
            }
        })
        .collect()
}

/// North, south, east and west elevations framing the bounds
pub fn elevations(bounds: &Aabb) -> Vec<ViewDefinition> {
    if bounds.is_empty() {
        return Vec::new();
    }
    let center = bounds.center();
    let size = bounds.size();

    Facing::ALL
        .iter()
        .map(|&facing| {
            let outward = facing.outward();
            // Half extent of the bounds along the viewing axis
            let reach = (size.component_mul(&outward)).norm() / 2.0;
            let width = if outward.x != 0.0 { size.y } else { size.x };
            ViewDefinition {
                id: format!("elevation-{}", facing.name().to_lowercase()),
                name: format!("{} Elevation", facing.name()),
                kind: ViewKind::Elevation(facing),
                position: center + outward * (reach + ELEVATION_CLEARANCE),
                target: center,
                up: Vector3::z(),
                width,
                height: size.z,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bounds() -> Aabb {
        Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 2.0, 3.0))
    }

    #[test]
    fn test_four_elevations() {
        let views = elevations(&bounds());
        let ids: Vec<&str> = views.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["elevation-north", "elevation-south", "elevation-east", "elevation-west"]
        );

        let north = &views[0];
        assert_eq!(north.name, "North Elevation");
        assert_relative_eq!(north.position, Point3::new(2.0, 3.0, 1.5), epsilon = 1e-12);
        assert_eq!((north.width, north.height), (4.0, 3.0));

        let west = &views[3];
        assert_relative_eq!(west.position, Point3::new(-1.0, 1.0, 1.5), epsilon = 1e-12);
        assert_eq!((west.width, west.height), (2.0, 3.0));
    }

    #[test]
    fn test_empty_bounds_have_no_elevations() {
        assert!(elevations(&Aabb::empty()).is_empty());
    }

    #[test]
    fn test_floor_plan_per_storey() {
        let storeys = vec![
            PlacedStorey { id: 5, name: "Ground".into(), elevation: 0.0 },
            PlacedStorey { id: 4, name: "Upper".into(), elevation: 3.0 },
        ];
        let plans = floor_plans(&storeys, &bounds());

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[1].id, "plan-4");
        assert_eq!(plans[1].target, Point3::new(2.0, 1.0, 3.0));
        assert_eq!(plans[1].position.z, 3.0 + PLAN_CUT_HEIGHT);
        assert_eq!(plans[1].up, Vector3::y());
    }
}
