//! Conversion between the indexed output form and the working graph.
//!
//! A clip call converts the indexed mesh to a graph once, mutates the
//! graph through every plane pass, and converts back once. Both
//! directions accept a translation so the caller can re-center working
//! coordinates near the origin and undo the shift on output.

use slotmap::SecondaryMap;

use crate::graph::{
    GraphStore, LineKey, LineRef, PointKey, WorkingLine, WorkingPoint, WorkingPolygon,
};
use crate::math::Vector3;
use crate::polyhedron::{IndexedLine, IndexedLineReference, IndexedPolygon, Polyhedron};

/// Builds a working graph from an indexed polyhedron, translating every
/// vertex by `offset`.
#[must_use]
pub fn graph_from_polyhedron(polyhedron: &Polyhedron, offset: Vector3) -> GraphStore {
    let mut store = GraphStore::new();

    let point_keys: Vec<PointKey> = polyhedron
        .vertices()
        .iter()
        .map(|v| store.add_point(WorkingPoint::new(v + offset)))
        .collect();

    let polygon_keys: Vec<_> = polyhedron
        .polygons()
        .iter()
        .map(|p| store.add_polygon(WorkingPolygon::new(p.normal)))
        .collect();

    let line_keys: Vec<LineKey> = polyhedron
        .lines()
        .iter()
        .map(|line| {
            let points = [
                point_keys[line.vertices[0] as usize],
                point_keys[line.vertices[1] as usize],
            ];
            // Polygon slots are claimed below while threading boundaries.
            let key = store.add_line(WorkingLine::new(points, [Default::default(); 2]));
            for p in points {
                store.point_mut(p).fan.push(key);
            }
            key
        })
        .collect();

    for (i, polygon) in polyhedron.polygons().iter().enumerate() {
        let first = polygon.first_ref as usize;
        let span = &polyhedron.line_refs()[first..first + polygon.ref_count as usize];
        let mut boundary = Vec::with_capacity(span.len());
        for r in span {
            let line = line_keys[r.line as usize];
            store.line_mut(line).polygons[r.end as usize] = polygon_keys[i];
            boundary.push(LineRef::new(line, r.end));
        }
        store.polygon_mut(polygon_keys[i]).boundary = boundary;
    }

    store
}

/// Flattens a working graph into the indexed output form, translating
/// every vertex by `offset`.
///
/// Iteration order of the arenas fixes the output indexing; the graph is
/// expected to be fully live (no dead nodes) when this is called.
#[must_use]
pub fn polyhedron_from_graph(store: &GraphStore, offset: Vector3) -> Polyhedron {
    let mut point_indices: SecondaryMap<PointKey, u32> = SecondaryMap::new();
    let mut vertices = Vec::with_capacity(store.point_count());
    for (i, (key, point)) in store.points().enumerate() {
        point_indices.insert(key, i as u32);
        vertices.push(point.position + offset);
    }

    let mut line_indices: SecondaryMap<LineKey, u32> = SecondaryMap::new();
    let mut lines = Vec::with_capacity(store.line_count());
    for (i, (key, line)) in store.lines().enumerate() {
        line_indices.insert(key, i as u32);
        lines.push(IndexedLine {
            vertices: [
                point_indices[line.points[0]],
                point_indices[line.points[1]],
            ],
        });
    }

    let mut line_refs = Vec::new();
    let mut polygons = Vec::with_capacity(store.polygon_count());
    for (_, polygon) in store.polygons() {
        let first_ref = line_refs.len() as u32;
        for r in &polygon.boundary {
            line_refs.push(IndexedLineReference {
                line: line_indices[r.line],
                end: r.end,
            });
        }
        polygons.push(IndexedPolygon {
            normal: polygon.normal,
            first_ref,
            ref_count: polygon.boundary.len() as u32,
        });
    }

    Polyhedron::from_raw_parts(vertices, lines, line_refs, polygons)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::MakeBox;

    #[test]
    fn cube_round_trips() {
        let cube = MakeBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
            .execute()
            .unwrap();
        let store = graph_from_polyhedron(&cube, Vector3::zeros());

        assert_eq!(store.point_count(), 8);
        assert_eq!(store.line_count(), 12);
        assert_eq!(store.polygon_count(), 6);

        // Every point fans out to exactly 3 lines on a cube.
        for (_, point) in store.points() {
            assert_eq!(point.fan.len(), 3);
        }

        let back = polyhedron_from_graph(&store, Vector3::zeros());
        back.validate().unwrap();
        assert_eq!(back.vertices().len(), 8);
        assert_eq!(back.lines().len(), 12);
        assert_eq!(back.polygons().len(), 6);
        approx::assert_relative_eq!(back.volume(), cube.volume(), epsilon = 1e-12);
    }

    #[test]
    fn offsets_shift_and_unshift() {
        let cube = MakeBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0))
            .execute()
            .unwrap();
        let shift = Vector3::new(-100.0, 50.0, 0.25);
        let store = graph_from_polyhedron(&cube, shift);
        let back = polyhedron_from_graph(&store, -shift);
        for (a, b) in cube.vertices().iter().zip(back.vertices()) {
            approx::assert_relative_eq!((a - b).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn boundary_loops_are_preserved() {
        let cube = MakeBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
            .execute()
            .unwrap();
        let store = graph_from_polyhedron(&cube, Vector3::zeros());
        for (key, polygon) in store.polygons() {
            assert_eq!(polygon.boundary.len(), 4);
            for (i, r) in polygon.boundary.iter().enumerate() {
                // The line's claimed slot points back at this polygon.
                assert_eq!(store.line(r.line).polygons[r.end as usize], key);
                // Consecutive references share an endpoint.
                let next = polygon.boundary[(i + 1) % polygon.boundary.len()];
                assert_eq!(store.ref_end(*r), store.ref_start(next));
            }
        }
    }
}
