//! The single-plane cut pass over the working graph.
//!
//! A pass classifies every point, walks the dead region, splits the
//! crossing lines at their plane intersections, rebuilds every affected
//! boundary loop around the cut, assembles the new cap polygon from the
//! loose cut edges and finally destroys the dead nodes and merges away
//! the degeneracies the surgery produced.

use slotmap::SecondaryMap;

use crate::graph::{
    GraphStore, LineKey, LineRef, PointKey, PolygonKey, WorkingLine, WorkingPoint, WorkingPolygon,
};
use crate::math::{Plane, Planarity};

use super::classify::{classify_against_plane, CutSets, PassOutcome};
use super::merge::{
    collapse_if_two_lined, collapse_short_line, fuse_concave_vertices, recompute_normal,
    remove_redundant_points_on,
};

/// Result of one cut pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CutOutcome {
    /// The plane does not touch the solid.
    Untouched,
    /// Material was removed; the graph holds the clipped solid.
    Clipped,
    /// Nothing survives on the keep side.
    Emptied,
}

/// Cuts the solid in `store` by `plane`, discarding everything on the
/// plane's positive side.
pub(super) fn cut_with_plane(store: &mut GraphStore, plane: &Plane, epsilon: f64) -> CutOutcome {
    let sets = match classify_against_plane(store, plane, epsilon) {
        PassOutcome::Untouched => return CutOutcome::Untouched,
        PassOutcome::Emptied => return CutOutcome::Emptied,
        PassOutcome::Cut(sets) => sets,
    };

    let affected = affected_polygons(store, &sets);
    split_cut_lines(store, &sets);

    // The cap exists before the boundary rebuild so bridges and adopted
    // lines can link to its real key.
    let cap = store.add_polygon(WorkingPolygon::new(plane.normal));
    let mut cap_refs: Vec<LineRef> = Vec::new();

    let mut dead_set: SecondaryMap<LineKey, ()> = SecondaryMap::new();
    for &line in &sets.dead_lines {
        dead_set.insert(line, ());
    }
    for &polygon in &affected {
        rebuild_boundary(store, polygon, cap, &dead_set, &mut cap_refs);
    }

    assemble_cap(store, cap, cap_refs);
    destroy_dead(store, &sets);

    // Surgery aftercare on everything the pass touched.
    sweep_short_lines(store, epsilon);
    for &polygon in &affected {
        remove_redundant_points_on(store, polygon);
    }
    remove_redundant_points_on(store, cap);
    sweep_short_lines(store, epsilon);
    for &polygon in &affected {
        recompute_normal(store, polygon);
    }
    for &polygon in &affected {
        fuse_concave_vertices(store, polygon);
    }
    fuse_concave_vertices(store, cap);

    if store.point_count() < 3 || store.polygon_count() < 2 {
        CutOutcome::Emptied
    } else {
        CutOutcome::Clipped
    }
}

/// Every polygon adjoining a dead or cut line, deduplicated.
fn affected_polygons(store: &GraphStore, sets: &CutSets) -> Vec<PolygonKey> {
    let mut seen: SecondaryMap<PolygonKey, ()> = SecondaryMap::new();
    let mut affected = Vec::new();
    for &line in sets.dead_lines.iter().chain(&sets.cut_lines) {
        for polygon in store.line(line).polygons {
            if seen.insert(polygon, ()).is_none() {
                affected.push(polygon);
            }
        }
    }
    affected
}

/// Splits every crossing line at its plane intersection: the dead
/// endpoint is replaced by a new on-plane point interpolated between the
/// endpoints, leaving the line entirely on the keep side.
fn split_cut_lines(store: &mut GraphStore, sets: &CutSets) {
    for &line in &sets.cut_lines {
        let points = store.line(line).points;
        let (alive, dead) = if store.point(points[0]).planarity == Planarity::Alive {
            (points[0], points[1])
        } else {
            (points[1], points[0])
        };
        debug_assert_eq!(store.point(dead).planarity, Planarity::Dead);

        let da = store.point(alive).distance;
        let dd = store.point(dead).distance;
        // da < 0 < dd, so t lands strictly inside (0, 1).
        let t = da / (da - dd);
        let position =
            store.point(alive).position + t * (store.point(dead).position - store.point(alive).position);

        let mut split = WorkingPoint::new(position);
        split.planarity = Planarity::OnPlane;
        let split = store.add_point(split);

        let Some(slot) = store.line(line).point_slot(dead) else {
            debug_assert!(false, "cut line lost its dead endpoint");
            continue;
        };
        store.unfan_line(dead, line);
        store.line_mut(line).points[slot] = split;
        store.line_mut(line).fresh = true;
        store.point_mut(split).fan.push(line);
    }
}

/// Rebuilds one affected boundary loop: drops the dead references and
/// closes the remaining chain, either directly (the cut grazed a single
/// vertex), by handing the last surviving line to the cap, or by
/// bridging the gap with a new on-plane line shared with the cap.
fn rebuild_boundary(
    store: &mut GraphStore,
    polygon: PolygonKey,
    cap: PolygonKey,
    dead_set: &SecondaryMap<LineKey, ()>,
    cap_refs: &mut Vec<LineRef>,
) {
    let boundary = store.polygon(polygon).boundary.clone();
    let kept: Vec<LineRef> = boundary
        .iter()
        .copied()
        .filter(|r| !dead_set.contains_key(r.line))
        .collect();

    if kept.is_empty() {
        store.remove_polygon(polygon);
        return;
    }

    // The dead span is contiguous on a convex face, and splitting the
    // crossing lines moved their endpoints, so the surviving chain has at
    // most one discontinuity. That seam is where the cap edge goes.
    let count = kept.len();
    let mut seam = None;
    let mut gaps = 0;
    for i in 0..count {
        if store.ref_end(kept[i]) != store.ref_start(kept[(i + 1) % count]) {
            gaps += 1;
            seam = Some((i + 1) % count);
        }
    }
    debug_assert!(gaps <= 1, "multiple gaps in one boundary loop");

    let Some(seam) = seam else {
        // Either untouched by the cut or the dead span collapsed onto a
        // single grazed vertex; the chain is already closed.
        if kept.len() < boundary.len() {
            store.polygon_mut(polygon).boundary = kept;
        }
        return;
    };

    let kept: Vec<LineRef> = (0..count).map(|k| kept[(seam + k) % count]).collect();
    let entry = store.ref_start(kept[0]);
    let exit = store.ref_end(kept[count - 1]);

    if kept.len() == 1 {
        // A single surviving line would leave a 2-line polygon after
        // bridging; hand the line straight to the cap instead.
        let adopted = kept[0];
        store.line_mut(adopted.line).polygons[adopted.end as usize] = cap;
        cap_refs.push(adopted);
        store.remove_polygon(polygon);
        return;
    }

    let bridge = store.add_line(WorkingLine::new([exit, entry], [cap, polygon]));
    store.line_mut(bridge).fresh = true;
    store.point_mut(exit).fan.push(bridge);
    store.point_mut(entry).fan.push(bridge);

    let mut rebuilt = kept;
    rebuilt.push(LineRef::new(bridge, 1));
    store.polygon_mut(polygon).boundary = rebuilt;
    cap_refs.push(LineRef::new(bridge, 0));
}

/// Threads the collected cap edges into one closed loop by chaining
/// endpoints; every edge already runs in cap traversal direction.
fn assemble_cap(store: &mut GraphStore, cap: PolygonKey, cap_refs: Vec<LineRef>) {
    if cap_refs.is_empty() {
        // Every affected loop closed on a grazed vertex.
        store.remove_polygon(cap);
        return;
    }

    let mut start_map: SecondaryMap<PointKey, LineRef> = SecondaryMap::new();
    for &r in &cap_refs {
        let prior = start_map.insert(store.ref_start(r), r);
        debug_assert!(prior.is_none(), "two cap edges leave one point");
    }

    let mut ordered = Vec::with_capacity(cap_refs.len());
    let mut current = cap_refs[0];
    for _ in 0..cap_refs.len() {
        ordered.push(current);
        match start_map.get(store.ref_end(current)) {
            Some(&next) => current = next,
            None => {
                debug_assert!(false, "open cap loop");
                break;
            }
        }
    }
    debug_assert_eq!(ordered.len(), cap_refs.len(), "cap loop missed edges");
    debug_assert_eq!(current, ordered[0], "cap loop does not close");

    store.polygon_mut(cap).boundary = ordered;
    collapse_if_two_lined(store, cap);
}

/// Removes the dead lines and points. Dead polygons were already removed
/// during the boundary rebuild.
fn destroy_dead(store: &mut GraphStore, sets: &CutSets) {
    for &line in &sets.dead_lines {
        let points = store.line(line).points;
        for p in points {
            store.unfan_line(p, line);
        }
        store.remove_line(line);
    }
    for &point in &sets.dead_points {
        debug_assert!(store.point(point).fan.is_empty(), "dead point still fanned");
        store.remove_point(point);
    }
}

/// Collapses every freshly created or re-lengthened line shorter than
/// `epsilon`.
fn sweep_short_lines(store: &mut GraphStore, epsilon: f64) {
    let fresh: Vec<LineKey> = store
        .lines()
        .filter(|(_, l)| l.fresh)
        .map(|(key, _)| key)
        .collect();
    for key in fresh {
        if !store.contains_line(key) {
            continue;
        }
        store.line_mut(key).fresh = false;
        let [a, b] = store.line(key).points;
        let length2 = (store.point(a).position - store.point(b).position).norm_squared();
        if length2 < epsilon * epsilon {
            collapse_short_line(store, key);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::graph::convert::{graph_from_polyhedron, polyhedron_from_graph};
    use crate::math::{Point3, Vector3};
    use crate::operations::creation::MakeBox;

    const EPSILON: f64 = 0.01;

    fn cube_store() -> GraphStore {
        let cube = MakeBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
            .execute()
            .unwrap();
        graph_from_polyhedron(&cube, Vector3::zeros())
    }

    #[test]
    fn plane_clear_of_the_solid_is_untouched() {
        let mut store = cube_store();
        let before = (store.point_count(), store.line_count(), store.polygon_count());
        let outcome = cut_with_plane(&mut store, &Plane::new(Vector3::x(), 1.5), EPSILON);
        assert_eq!(outcome, CutOutcome::Untouched);
        assert_eq!(
            before,
            (store.point_count(), store.line_count(), store.polygon_count())
        );
    }

    #[test]
    fn plane_consuming_the_solid_empties() {
        let mut store = cube_store();
        let outcome = cut_with_plane(&mut store, &Plane::new(Vector3::x(), -1.5), EPSILON);
        assert_eq!(outcome, CutOutcome::Emptied);
    }

    #[test]
    fn axis_cut_produces_a_smaller_box() {
        let mut store = cube_store();
        let outcome = cut_with_plane(&mut store, &Plane::new(Vector3::x(), 0.5), EPSILON);
        assert_eq!(outcome, CutOutcome::Clipped);
        assert_eq!(store.point_count(), 8);
        assert_eq!(store.line_count(), 12);
        assert_eq!(store.polygon_count(), 6);

        let result = polyhedron_from_graph(&store, Vector3::zeros());
        result.validate().unwrap();
        assert_relative_eq!(result.volume(), 1.5 * 2.0 * 2.0, epsilon = 1e-9);
        let (mins, maxs) = result.aabb().unwrap();
        assert_relative_eq!(maxs.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(mins.x, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn diagonal_cut_through_vertices_yields_a_prism() {
        let mut store = cube_store();
        let normal = Vector3::new(1.0, 1.0, 0.0).normalize();
        let outcome = cut_with_plane(&mut store, &Plane::new(normal, 0.0), EPSILON);
        assert_eq!(outcome, CutOutcome::Clipped);
        // Triangular prism: the cap absorbs the two on-plane cube edges.
        assert_eq!(store.point_count(), 6);
        assert_eq!(store.line_count(), 9);
        assert_eq!(store.polygon_count(), 5);

        let result = polyhedron_from_graph(&store, Vector3::zeros());
        result.validate().unwrap();
        assert_relative_eq!(result.volume(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn corner_cut_adds_a_triangular_cap() {
        let mut store = cube_store();
        let normal = Vector3::new(1.0, 1.0, 1.0).normalize();
        // The (1,1,1) corner sits at distance sqrt(3); a plane at 1.5
        // shaves it off without reaching any other vertex.
        let outcome = cut_with_plane(&mut store, &Plane::new(normal, 1.5), EPSILON);
        assert_eq!(outcome, CutOutcome::Clipped);
        // One corner vertex replaced by three, one new triangular face.
        assert_eq!(store.point_count(), 10);
        assert_eq!(store.line_count(), 15);
        assert_eq!(store.polygon_count(), 7);

        let result = polyhedron_from_graph(&store, Vector3::zeros());
        result.validate().unwrap();
        assert!(result.volume() < 8.0);
    }

    #[test]
    fn repeated_cut_is_idempotent() {
        let mut store = cube_store();
        let plane = Plane::new(Vector3::x(), 0.5);
        assert_eq!(cut_with_plane(&mut store, &plane, EPSILON), CutOutcome::Clipped);
        let volume = polyhedron_from_graph(&store, Vector3::zeros()).volume();
        // The second pass finds the cap already on the plane.
        assert_eq!(cut_with_plane(&mut store, &plane, EPSILON), CutOutcome::Untouched);
        let again = polyhedron_from_graph(&store, Vector3::zeros()).volume();
        assert_relative_eq!(volume, again, epsilon = 1e-12);
    }
}
