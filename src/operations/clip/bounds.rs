//! Loose axis-aligned bounds estimation for planes-only construction.
//!
//! Before any carving can start, the plane set alone has to yield a
//! finite region to seed from. Each plane is relaxed outward and turned
//! into a huge polygon that is then clipped by every other plane; the
//! bounds of whatever survives safely contain the final solid. The
//! estimate is deliberately loose, the carve tightens it.

use crate::math::{clip_polygon_to_plane, polygon_in_plane, Plane, Point3};

/// Outward slack applied to every plane before clipping, so coplanar and
/// nearly-coplanar planes cannot cancel each other's polygons.
const PLANE_RELAXATION: f64 = 100.0;

/// Half-extent of the seed polygon laid into each relaxed plane.
const SEED_POLYGON_RADIUS: f64 = 100_000.0;

/// Estimates loose bounds of the region enclosed by `planes`, whose
/// normals point inward (the region lies on each plane's positive side).
///
/// Returns `None` when the planes contradict each other and enclose
/// nothing, which makes the plane set unusable for construction.
pub(super) fn loose_bounds(planes: &[Plane]) -> Option<(Point3, Point3)> {
    let mut mins = Point3::new(f64::MAX, f64::MAX, f64::MAX);
    let mut maxs = Point3::new(f64::MIN, f64::MIN, f64::MIN);
    let mut any = false;

    for (i, plane) in planes.iter().enumerate() {
        // Pushing the plane backward along its inward normal relaxes the
        // region outward.
        let relaxed = Plane::new(plane.normal, plane.dist - PLANE_RELAXATION);
        let mut polygon = polygon_in_plane(&relaxed, SEED_POLYGON_RADIUS);

        for (j, other) in planes.iter().enumerate() {
            if i == j {
                continue;
            }
            let other = Plane::new(other.normal, other.dist - PLANE_RELAXATION);
            polygon = clip_polygon_to_plane(&polygon, &other, 0.0);
            if polygon.is_empty() {
                break;
            }
        }

        // Fewer than 3 survivors is clipping debris, not area.
        if polygon.len() >= 3 {
            for corner in &polygon {
                any = true;
                mins = mins.inf(corner);
                maxs = maxs.sup(corner);
            }
        }
    }

    any.then_some((mins, maxs))
}
