//! Simple polygon-vs-plane clipping used by the loose bounds estimator.
//!
//! This is the classic Sutherland–Hodgman clip over a free-standing vertex
//! loop. The working-graph cut in `operations::clip` never goes through
//! here; these helpers only serve the per-plane polygon sweep that sizes
//! the seed box.

use crate::math::{Plane, Point3, Vector3};

/// Builds a large square polygon lying in the given plane.
///
/// The square is centered on the plane's closest point to the origin and
/// extends `radius` units along two in-plane axes. Returns an empty vector
/// for a degenerate (near-zero) normal.
#[must_use]
pub fn polygon_in_plane(plane: &Plane, radius: f64) -> Vec<Point3> {
    let n = plane.normal;
    if n.norm_squared() < f64::EPSILON {
        return Vec::new();
    }

    // Reference axis least aligned with the normal.
    let abs = n.abs();
    let reference = if abs.x <= abs.y && abs.x <= abs.z {
        Vector3::new(1.0, 0.0, 0.0)
    } else if abs.y <= abs.z {
        Vector3::new(0.0, 1.0, 0.0)
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    };

    let u = n.cross(&reference).normalize() * radius;
    let v = n.cross(&(u / radius)) * radius;
    let center = Point3::from(n * plane.dist);

    vec![center - u - v, center - u + v, center + u + v, center + u - v]
}

/// Clips a convex polygon against a plane, keeping the side the normal
/// points toward.
///
/// `epsilon` widens the kept side; vertices within the band survive.
/// Returns the surviving loop, which may have fewer than 3 vertices when
/// the polygon is (almost) entirely behind the plane.
#[must_use]
pub fn clip_polygon_to_plane(polygon: &[Point3], plane: &Plane, epsilon: f64) -> Vec<Point3> {
    let n = polygon.len();
    let mut kept = Vec::with_capacity(n + 1);

    for i in 0..n {
        let j = (i + 1) % n;
        // Kept side here is the *front* of the plane, so the sign flips
        // relative to clipping (the estimator feeds inward-facing planes).
        let di = plane.distance_to(&polygon[i]);
        let dj = plane.distance_to(&polygon[j]);

        if di >= -epsilon {
            kept.push(polygon[i]);
        }

        // Edge crosses the boundary: emit the crossing point.
        if (di > epsilon && dj < -epsilon) || (di < -epsilon && dj > epsilon) {
            let t = di / (di - dj);
            kept.push(polygon[i] + (polygon[j] - polygon[i]) * t);
        }
    }

    kept
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn seed_polygon_lies_in_plane() {
        let plane = Plane::new(Vector3::new(0.0, 1.0, 0.0), 3.0);
        let poly = polygon_in_plane(&plane, 100.0);
        assert_eq!(poly.len(), 4);
        for p in &poly {
            assert_relative_eq!(plane.distance_to(p), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn clip_square_in_half() {
        let square = vec![
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 1.0, 0.0),
        ];
        // Keep x >= 0.
        let plane = Plane::new(Vector3::new(1.0, 0.0, 0.0), 0.0);
        let kept = clip_polygon_to_plane(&square, &plane, 0.0);
        assert_eq!(kept.len(), 4);
        for p in &kept {
            assert!(p.x >= -1e-9);
        }
        assert!(kept.iter().any(|p| (p.x - 1.0).abs() < 1e-9));
    }

    #[test]
    fn clip_removes_everything_behind() {
        let square = vec![
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 1.0, 0.0),
        ];
        let plane = Plane::new(Vector3::new(1.0, 0.0, 0.0), 5.0);
        assert!(clip_polygon_to_plane(&square, &plane, 0.0).len() < 3);
    }

    #[test]
    fn untouched_polygon_survives_whole() {
        let square = vec![
            Point3::new(-1.0, -1.0, 2.0),
            Point3::new(1.0, -1.0, 2.0),
            Point3::new(1.0, 1.0, 2.0),
            Point3::new(-1.0, 1.0, 2.0),
        ];
        let plane = Plane::new(Vector3::new(0.0, 0.0, 1.0), 0.0);
        assert_eq!(clip_polygon_to_plane(&square, &plane, 0.0).len(), 4);
    }
}
