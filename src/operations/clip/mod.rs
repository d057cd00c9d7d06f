//! Plane-clipping operations: carving an existing polyhedron and
//! constructing one from nothing but a plane set.
//!
//! Both operations work far from the origin without losing precision:
//! the solid is shifted to a whole-unit offset near the origin, carved
//! there, and shifted back on output.

mod bounds;
mod classify;
mod cut;
mod merge;

use crate::error::{OperationError, Result};
use crate::graph::convert::{graph_from_polyhedron, polyhedron_from_graph};
use crate::math::{Plane, Point3, Vector3, DEFAULT_ON_PLANE_EPSILON};
use crate::operations::creation::MakeBox;
use crate::polyhedron::Polyhedron;

use bounds::loose_bounds;
use cut::{cut_with_plane, CutOutcome};

/// Padding added around the loose bounds when sizing the seed box for
/// planes-only construction, in world units per side.
const SEED_BOX_PADDING: f64 = 10.0;

/// Clips a polyhedron by a set of outward-facing planes, removing
/// everything on each plane's normal side.
///
/// Planes that cannot remove any vertex are skipped up front, so feeding
/// a solid its own bounding planes is a cheap no-op.
#[derive(Debug, Clone)]
pub struct ClipPolyhedron<'a> {
    polyhedron: &'a Polyhedron,
    planes: &'a [Plane],
    epsilon: f64,
}

impl<'a> ClipPolyhedron<'a> {
    /// Creates a new clip operation with the default on-plane epsilon.
    #[must_use]
    pub fn new(polyhedron: &'a Polyhedron, planes: &'a [Plane]) -> Self {
        Self {
            polyhedron,
            planes,
            epsilon: DEFAULT_ON_PLANE_EPSILON,
        }
    }

    /// Overrides the on-plane epsilon.
    #[must_use]
    pub fn with_epsilon(self, epsilon: f64) -> Self {
        Self { epsilon, ..self }
    }

    /// Executes the operation.
    ///
    /// Returns `Ok(None)` when the planes clip the solid away entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the input polyhedron is below the minimum
    /// closed-solid complexity.
    pub fn execute(&self) -> Result<Option<Polyhedron>> {
        if self.polyhedron.vertices().len() < 3 || self.polyhedron.polygons().len() < 2 {
            return Err(OperationError::InvalidInput(
                "polyhedron must have at least 3 vertices and 2 polygons".to_owned(),
            )
            .into());
        }

        // Prefilter: a plane with no vertex beyond it removes nothing; a
        // plane with no vertex in front of it removes everything.
        let mut useful: Vec<&Plane> = Vec::new();
        for plane in self.planes {
            let mut any_dead = false;
            let mut any_alive = false;
            for vertex in self.polyhedron.vertices() {
                let distance = plane.distance_to(vertex);
                any_dead |= distance > self.epsilon;
                any_alive |= distance < -self.epsilon;
            }
            if any_dead && !any_alive {
                return Ok(None);
            }
            if any_dead {
                useful.push(plane);
            }
        }
        if useful.is_empty() {
            return Ok(Some(self.polyhedron.clone()));
        }

        let centroid = self
            .polyhedron
            .vertices()
            .iter()
            .map(|v| v.coords)
            .sum::<Vector3>()
            / self.polyhedron.vertices().len() as f64;
        let offset = recentering_offset(Point3::from(centroid));
        let mut store = graph_from_polyhedron(self.polyhedron, offset);

        for plane in useful {
            let shifted = plane.translated(&offset);
            if cut_with_plane(&mut store, &shifted, self.epsilon) == CutOutcome::Emptied {
                return Ok(None);
            }
        }

        Ok(Some(polyhedron_from_graph(&store, -offset)))
    }
}

/// Constructs a polyhedron as the intersection of the half-spaces below
/// a set of outward-facing planes.
///
/// The construction carves a seed box, sized from a loose bounds
/// estimate of the plane set, down with one cut per plane.
#[derive(Debug, Clone)]
pub struct GeneratePolyhedronFromPlanes<'a> {
    planes: &'a [Plane],
    epsilon: f64,
}

impl<'a> GeneratePolyhedronFromPlanes<'a> {
    /// Creates a new construction operation with the default on-plane
    /// epsilon.
    #[must_use]
    pub fn new(planes: &'a [Plane]) -> Self {
        Self {
            planes,
            epsilon: DEFAULT_ON_PLANE_EPSILON,
        }
    }

    /// Overrides the on-plane epsilon.
    #[must_use]
    pub fn with_epsilon(self, epsilon: f64) -> Self {
        Self { epsilon, ..self }
    }

    /// Executes the operation.
    ///
    /// Returns `Ok(None)` when the planes enclose no volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed box cannot be built, which only
    /// happens when the bounds estimate degenerates to zero extent.
    pub fn execute(&self) -> Result<Option<Polyhedron>> {
        let inward: Vec<Plane> = self.planes.iter().map(Plane::flipped).collect();
        let Some((mins, maxs)) = loose_bounds(&inward) else {
            return Ok(None);
        };

        // Pad generously and snap to whole units; the cuts reclaim every
        // bit of slack, and integral seed coordinates keep the early
        // passes exact.
        let grow = (maxs - mins) * 0.5 + Vector3::repeat(SEED_BOX_PADDING);
        let mins = Point3::from((mins - grow).coords.map(f64::floor));
        let maxs = Point3::from((maxs + grow).coords.map(f64::floor));

        let offset = recentering_offset(Point3::from((mins.coords + maxs.coords) * 0.5));
        let seed = MakeBox::new(mins + offset, maxs + offset).execute()?;
        let mut store = graph_from_polyhedron(&seed, Vector3::zeros());

        for plane in self.planes {
            let shifted = plane.translated(&offset);
            if cut_with_plane(&mut store, &shifted, self.epsilon) == CutOutcome::Emptied {
                return Ok(None);
            }
        }

        Ok(Some(polyhedron_from_graph(&store, -offset)))
    }
}

/// Whole-unit translation that brings `center` close to the origin.
///
/// Snapping to whole units keeps grid-aligned input coordinates exact
/// through the shift.
fn recentering_offset(center: Point3) -> Vector3 {
    Vector3::new((-center.x).floor(), (-center.y).floor(), (-center.z).floor())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn cube() -> Polyhedron {
        MakeBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
            .execute()
            .unwrap()
    }

    fn tetrahedron() -> Polyhedron {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let faces = vec![vec![0, 2, 1], vec![0, 1, 3], vec![1, 2, 3], vec![0, 3, 2]];
        Polyhedron::from_faces(vertices, &faces).unwrap()
    }

    /// Outward-facing planes of the cube `[-1, 1]^3`.
    fn cube_planes() -> Vec<Plane> {
        vec![
            Plane::new(Vector3::x(), 1.0),
            Plane::new(-Vector3::x(), 1.0),
            Plane::new(Vector3::y(), 1.0),
            Plane::new(-Vector3::y(), 1.0),
            Plane::new(Vector3::z(), 1.0),
            Plane::new(-Vector3::z(), 1.0),
        ]
    }

    #[test]
    fn single_axis_clip_shrinks_the_cube() {
        let cube = cube();
        let planes = [Plane::new(Vector3::x(), 0.5)];
        let result = ClipPolyhedron::new(&cube, &planes).execute().unwrap().unwrap();

        result.validate().unwrap();
        assert_eq!(result.vertices().len(), 8);
        assert_eq!(result.polygons().len(), 6);
        assert_relative_eq!(result.volume(), 6.0, epsilon = 1e-9);
        let (_, maxs) = result.aabb().unwrap();
        assert_relative_eq!(maxs.x, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn useless_planes_return_the_input_unchanged() {
        let cube = cube();
        // The cube's own planes plus a duplicate cannot remove a vertex.
        let mut planes = cube_planes();
        planes.push(Plane::new(Vector3::x(), 1.0));
        let result = ClipPolyhedron::new(&cube, &planes).execute().unwrap().unwrap();
        assert_eq!(result, cube);
    }

    #[test]
    fn plane_behind_the_solid_clips_everything() {
        let cube = cube();
        let planes = [Plane::new(Vector3::x(), -2.0)];
        assert!(ClipPolyhedron::new(&cube, &planes).execute().unwrap().is_none());
    }

    #[test]
    fn degenerate_input_is_rejected() {
        let cube = cube();
        let empty = ClipPolyhedron::new(&cube, &[]).execute().unwrap().unwrap();
        assert_eq!(empty, cube);

        // A faceless vertex cloud is structurally fine but below the
        // minimum a clip can operate on.
        let vertices = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let skeleton = Polyhedron::from_faces(vertices, &[]).unwrap();
        let planes = [Plane::new(Vector3::x(), 0.5)];
        assert!(ClipPolyhedron::new(&skeleton, &planes).execute().is_err());
    }

    #[test]
    fn diagonal_clip_yields_a_prism() {
        let cube = cube();
        let normal = Vector3::new(1.0, 1.0, 0.0).normalize();
        let planes = [Plane::new(normal, 0.0)];
        let result = ClipPolyhedron::new(&cube, &planes).execute().unwrap().unwrap();

        result.validate().unwrap();
        assert_eq!(result.vertices().len(), 6);
        assert_eq!(result.polygons().len(), 5);
        assert_relative_eq!(result.volume(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn clip_through_a_tetrahedron_vertex() {
        let tetra = tetrahedron();
        // The plane contains the apex and one base vertex and bisects the
        // base, so the cut runs straight through two existing vertices.
        let normal = Vector3::new(1.0, -1.0, 0.0).normalize();
        let planes = [Plane::new(normal, 0.0)];
        let result = ClipPolyhedron::new(&tetra, &planes).execute().unwrap().unwrap();

        result.validate().unwrap();
        assert_eq!(result.vertices().len(), 4);
        assert_eq!(result.polygons().len(), 4);
        for polygon in result.polygons() {
            assert!(polygon.ref_count >= 3);
        }
        assert_relative_eq!(result.volume(), 1.0 / 12.0, epsilon = 1e-9);
    }

    #[test]
    fn clip_order_does_not_change_the_result() {
        let cube = cube();
        let a = Plane::new(Vector3::x(), 0.25);
        let b = Plane::new(Vector3::new(0.0, 1.0, 1.0).normalize(), 0.5);

        let ab = ClipPolyhedron::new(&cube, &[a, b]).execute().unwrap().unwrap();
        let ba = ClipPolyhedron::new(&cube, &[b, a]).execute().unwrap().unwrap();

        ab.validate().unwrap();
        ba.validate().unwrap();
        assert_eq!(ab.vertices().len(), ba.vertices().len());
        assert_eq!(ab.polygons().len(), ba.polygons().len());
        assert_relative_eq!(ab.volume(), ba.volume(), epsilon = 1e-9);

        // Same vertex set, independent of indexing order.
        for v in ab.vertices() {
            assert!(ba.vertices().iter().any(|w| (v - w).norm() < 1e-9));
        }
    }

    #[test]
    fn each_cut_only_removes_volume() {
        let cube = cube();
        let planes = [
            Plane::new(Vector3::x(), 0.5),
            Plane::new(Vector3::new(1.0, 1.0, 1.0).normalize(), 0.75),
            Plane::new(-Vector3::z(), 0.25),
        ];

        let mut volume = cube.volume();
        let mut current = cube;
        for plane in planes {
            let clipped = ClipPolyhedron::new(&current, &[plane])
                .execute()
                .unwrap()
                .unwrap();
            clipped.validate().unwrap();
            assert!(clipped.volume() <= volume + 1e-9);
            volume = clipped.volume();
            current = clipped;
        }
    }

    #[test]
    fn recentering_preserves_far_away_solids() {
        let mins = Point3::new(9999.25, -5000.75, 12345.5);
        let maxs = mins + Vector3::repeat(2.0);
        let far = MakeBox::new(mins, maxs).execute().unwrap();
        let planes = [Plane::new(Vector3::x(), mins.x + 1.0)];

        let result = ClipPolyhedron::new(&far, &planes).execute().unwrap().unwrap();
        result.validate().unwrap();
        assert_relative_eq!(result.volume(), 4.0, epsilon = 1e-6);
        let (got_mins, got_maxs) = result.aabb().unwrap();
        assert_relative_eq!(got_mins.x, mins.x, epsilon = 1e-6);
        assert_relative_eq!(got_maxs.x, mins.x + 1.0, epsilon = 1e-6);
    }

    #[test]
    fn generate_a_cube_from_its_planes() {
        let result = GeneratePolyhedronFromPlanes::new(&cube_planes())
            .execute()
            .unwrap()
            .unwrap();

        result.validate().unwrap();
        assert_eq!(result.vertices().len(), 8);
        assert_eq!(result.polygons().len(), 6);
        assert_relative_eq!(result.volume(), 8.0, epsilon = 1e-9);
        let (mins, maxs) = result.aabb().unwrap();
        assert_relative_eq!((mins - Point3::new(-1.0, -1.0, -1.0)).norm(), 0.0, epsilon = 1e-9);
        assert_relative_eq!((maxs - Point3::new(1.0, 1.0, 1.0)).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn generate_an_unbounded_or_empty_set_fails_soft() {
        // Contradictory planes enclose nothing.
        let planes = [
            Plane::new(Vector3::z(), -300.0),
            Plane::new(-Vector3::z(), -300.0),
        ];
        assert!(GeneratePolyhedronFromPlanes::new(&planes)
            .execute()
            .unwrap()
            .is_none());

        assert!(GeneratePolyhedronFromPlanes::new(&[])
            .execute()
            .unwrap()
            .is_none());
    }

    #[test]
    fn generate_a_sheared_solid() {
        // A cube with one corner sliced off.
        let mut planes = cube_planes();
        planes.push(Plane::new(Vector3::new(1.0, 1.0, 1.0).normalize(), 1.5));
        let result = GeneratePolyhedronFromPlanes::new(&planes)
            .execute()
            .unwrap()
            .unwrap();

        result.validate().unwrap();
        assert_eq!(result.polygons().len(), 7);
        assert!(result.volume() < 8.0);
        assert!(result.volume() > 7.0);
    }
}
