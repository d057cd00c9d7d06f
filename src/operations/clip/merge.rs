//! Degenerate cleanup invoked opportunistically during a cut pass.
//!
//! Never a separate global pass: each helper is called on the features a
//! cut actually touched. Collapses can cascade (a short edge collapse can
//! produce a 2-line polygon, whose removal can leave a redundant point),
//! but every step strictly reduces the feature count, so they terminate.

use crate::graph::{GraphStore, LineKey, LineRef, PointKey, PolygonKey};
use crate::polyhedron::newell_normal;

/// Angular slack for the concavity check, scaled by edge lengths.
const CONCAVITY_SLACK: f64 = 1e-9;

/// Neighbor normals must be this aligned before a concave vertex may fuse
/// two polygons; anything less agreeing is genuine corruption, not drift.
const COPLANAR_DOT: f64 = 0.999;

/// Collapses a sub-epsilon line by unifying its endpoints.
///
/// The first endpoint survives; every line that referenced the doomed
/// endpoint is repointed at it. Self-loops this creates are deleted, and
/// any polygon reduced to 2 lines is collapsed the same way.
pub(super) fn collapse_short_line(store: &mut GraphStore, line: LineKey) {
    let [keep_point, dead_point] = store.line(line).points;
    debug_assert_ne!(keep_point, dead_point);
    let polygons = store.line(line).polygons;

    store.unfan_line(keep_point, line);
    store.unfan_line(dead_point, line);

    let mut two_line_candidates: Vec<PolygonKey> = Vec::new();
    for polygon in dedup_pair(polygons) {
        if store.contains_polygon(polygon) {
            store
                .polygon_mut(polygon)
                .boundary
                .retain(|r| r.line != line);
            two_line_candidates.push(polygon);
        }
    }

    // Repoint every line that used the doomed endpoint.
    let moved: Vec<LineKey> = store.point(dead_point).fan.clone();
    for m in moved {
        let Some(slot) = store.line(m).point_slot(dead_point) else {
            debug_assert!(false, "fan entry without the fanned point");
            continue;
        };
        if store.line(m).points[1 - slot] == keep_point {
            // The move would leave a zero-length self-loop; drop it.
            store.unfan_line(keep_point, m);
            for polygon in dedup_pair(store.line(m).polygons) {
                if store.contains_polygon(polygon) {
                    store.polygon_mut(polygon).boundary.retain(|r| r.line != m);
                    two_line_candidates.push(polygon);
                }
            }
            store.remove_line(m);
        } else {
            store.line_mut(m).points[slot] = keep_point;
            store.line_mut(m).fresh = true;
            store.point_mut(keep_point).fan.push(m);
        }
    }

    store.remove_point(dead_point);
    store.remove_line(line);

    for polygon in two_line_candidates {
        collapse_if_two_lined(store, polygon);
    }
    remove_redundant_point(store, keep_point);
}

/// Collapses `polygon` if it survives and is down to exactly 2 lines.
pub(super) fn collapse_if_two_lined(store: &mut GraphStore, polygon: PolygonKey) {
    if store.contains_polygon(polygon) && store.polygon(polygon).boundary.len() == 2 {
        collapse_degenerate_polygon(store, polygon);
    }
}

/// Removes a 2-line polygon by fusing its two (necessarily duplicate)
/// lines: one line survives and takes over the other's outer polygon
/// link, the other dies with the polygon.
pub(super) fn collapse_degenerate_polygon(store: &mut GraphStore, polygon: PolygonKey) {
    let boundary = store.polygon(polygon).boundary.clone();
    debug_assert_eq!(boundary.len(), 2);
    let Some([keep_ref, dead_ref]) = <[LineRef; 2]>::try_from(boundary).ok() else {
        return;
    };

    if keep_ref.line == dead_ref.line {
        // The polygon is a slit bounded by one line used twice: both the
        // polygon and the line are redundant.
        let line = keep_ref.line;
        let points = store.line(line).points;
        for p in points {
            store.unfan_line(p, line);
        }
        store.remove_line(line);
        store.remove_polygon(polygon);
        for p in points {
            remove_redundant_point(store, p);
        }
        return;
    }

    let keep = keep_ref.line;
    let dead = dead_ref.line;
    debug_assert_eq!(
        sorted_pair(store.line(keep).points),
        sorted_pair(store.line(dead).points),
        "2-line polygon with mismatched endpoints"
    );

    // The survivor inherits the outer polygon on the dead line's far side.
    let outer = store.line(dead).polygons[1 - dead_ref.end as usize];
    store.line_mut(keep).polygons[keep_ref.end as usize] = outer;

    // The outer polygon traverses toward the same physical point either
    // way; the survivor's claimed slot is the replacement reference.
    if store.contains_polygon(outer) {
        let replacement = LineRef::new(keep, keep_ref.end);
        for r in &mut store.polygon_mut(outer).boundary {
            if r.line == dead {
                *r = replacement;
            }
        }
    }

    let dead_points = store.line(dead).points;
    for p in dead_points {
        store.unfan_line(p, dead);
    }
    store.remove_line(dead);
    store.remove_polygon(polygon);

    for p in dead_points {
        remove_redundant_point(store, p);
    }
}

/// Removes `point` if it is redundant: connected to exactly 2 lines that
/// are bounded by the same 2 polygons. One line absorbs the other's span
/// and the point disappears from both boundary loops.
///
/// Returns `true` if the point was removed. Cascades into the far
/// endpoint and into any polygon left with 2 lines.
pub(super) fn remove_redundant_point(store: &mut GraphStore, point: PointKey) -> bool {
    if !store.contains_point(point) {
        return false;
    }
    let fan = store.point(point).fan.clone();
    let [l1, l2] = fan[..] else {
        return false;
    };
    if l1 == l2 {
        debug_assert!(false, "duplicate fan entry");
        return false;
    }
    if sorted_pair(store.line(l1).polygons) != sorted_pair(store.line(l2).polygons) {
        // Legitimately 2-fanned only while surgery is in flight or for a
        // flat 2-polygon solid; nothing to merge here.
        return false;
    }

    let far1 = store.line(l1).other_point(point);
    let far2 = store.line(l2).other_point(point);
    let polygons = store.line(l2).polygons;

    if far1 == far2 {
        // A spike: both lines span the same endpoints through this point.
        for line in [l1, l2] {
            store.unfan_line(far1, line);
            for polygon in dedup_pair(store.line(line).polygons) {
                if store.contains_polygon(polygon) {
                    store.polygon_mut(polygon).boundary.retain(|r| r.line != line);
                }
            }
            store.remove_line(line);
        }
        store.remove_point(point);
        for polygon in dedup_pair(polygons) {
            collapse_if_two_lined(store, polygon);
        }
        remove_redundant_point(store, far1);
        return true;
    }

    // Extend l1 across the point and drop l2.
    let Some(slot) = store.line(l1).point_slot(point) else {
        return false;
    };
    store.line_mut(l1).points[slot] = far2;
    store.line_mut(l1).fresh = true;
    store.unfan_line(far2, l2);
    store.point_mut(far2).fan.push(l1);

    for polygon in dedup_pair(polygons) {
        if store.contains_polygon(polygon) {
            store.polygon_mut(polygon).boundary.retain(|r| r.line != l2);
        }
    }
    store.remove_line(l2);
    store.remove_point(point);

    for polygon in dedup_pair(polygons) {
        collapse_if_two_lined(store, polygon);
    }
    remove_redundant_point(store, far2);
    true
}

/// Re-walks one polygon and removes every redundant boundary point.
pub(super) fn remove_redundant_points_on(store: &mut GraphStore, polygon: PolygonKey) {
    if !store.contains_polygon(polygon) {
        return;
    }
    let corners: Vec<PointKey> = store
        .polygon(polygon)
        .boundary
        .iter()
        .map(|&r| store.ref_end(r))
        .collect();
    for corner in corners {
        remove_redundant_point(store, corner);
    }
}

/// Recomputes the polygon normal by the Newell cross-product sum over its
/// boundary loop, robust to non-planar drift. Degenerate loops keep their
/// previous normal.
pub(super) fn recompute_normal(store: &mut GraphStore, polygon: PolygonKey) {
    if !store.contains_polygon(polygon) {
        return;
    }
    let corners: Vec<_> = store
        .polygon(polygon)
        .boundary
        .iter()
        .map(|&r| store.point(store.ref_end(r)).position)
        .collect();
    let normal = newell_normal(&corners);
    if normal.norm_squared() > 0.0 {
        store.polygon_mut(polygon).normal = normal;
    }
}

/// Removes boundary vertices that turn against the polygon normal by
/// fusing the polygon with its near-coplanar neighbor across the
/// offending line. Concavity on a carved convex solid can only come from
/// float drift between two faces that should be one.
pub(super) fn fuse_concave_vertices(store: &mut GraphStore, polygon: PolygonKey) {
    loop {
        if !store.contains_polygon(polygon) {
            return;
        }
        let boundary = store.polygon(polygon).boundary.clone();
        let count = boundary.len();
        if count < 3 {
            return;
        }
        let normal = store.polygon(polygon).normal;

        let mut fused = false;
        for i in 0..count {
            let vertex = store.ref_end(boundary[i]);
            let before = store.point(store.ref_start(boundary[i])).position;
            let at = store.point(vertex).position;
            let next_ref = boundary[(i + 1) % count];
            let after = store.point(store.ref_end(next_ref)).position;

            let e1 = at - before;
            let e2 = after - at;
            let turn = e1.cross(&e2).dot(&normal);
            if turn >= -CONCAVITY_SLACK * e1.norm() * e2.norm() {
                continue;
            }

            let neighbor = store.line(next_ref.line).polygons[1 - next_ref.end as usize];
            if neighbor == polygon {
                continue;
            }
            if store.polygon(neighbor).normal.dot(&normal) < COPLANAR_DOT {
                // Not coplanar drift; leave it for the debug invariants.
                continue;
            }

            fuse_polygons(store, polygon, neighbor, next_ref.line);
            recompute_normal(store, polygon);
            fused = true;
            break;
        }

        if !fused {
            return;
        }
    }
}

/// Fuses `dying` into `keep` across their shared line, re-threading the
/// boundary loops and deleting the shared line.
fn fuse_polygons(store: &mut GraphStore, keep: PolygonKey, dying: PolygonKey, shared: LineKey) {
    let keep_boundary = store.polygon(keep).boundary.clone();
    let dying_boundary = store.polygon(dying).boundary.clone();

    let Some(ki) = keep_boundary.iter().position(|r| r.line == shared) else {
        debug_assert!(false, "shared line missing from keeper's loop");
        return;
    };
    let Some(di) = dying_boundary.iter().position(|r| r.line == shared) else {
        debug_assert!(false, "shared line missing from dying loop");
        return;
    };

    // Splice the dying loop (minus the shared line) into the keeper's
    // loop where the shared line sat; the pieces join endpoint-to-endpoint
    // because the two polygons traverse the shared line oppositely.
    let mut merged = Vec::with_capacity(keep_boundary.len() + dying_boundary.len() - 2);
    merged.extend_from_slice(&keep_boundary[..ki]);
    merged.extend_from_slice(&dying_boundary[di + 1..]);
    merged.extend_from_slice(&dying_boundary[..di]);
    merged.extend_from_slice(&keep_boundary[ki + 1..]);

    // Re-point every surviving ref the dying polygon owned.
    for r in dying_boundary {
        if r.line != shared {
            store.line_mut(r.line).polygons[r.end as usize] = keep;
        }
    }

    let shared_points = store.line(shared).points;
    for p in shared_points {
        store.unfan_line(p, shared);
    }
    store.remove_line(shared);
    store.remove_polygon(dying);
    store.polygon_mut(keep).boundary = merged;

    for p in shared_points {
        remove_redundant_point(store, p);
    }
}

fn sorted_pair<T: Ord + Copy>(pair: [T; 2]) -> [T; 2] {
    if pair[0] <= pair[1] {
        pair
    } else {
        [pair[1], pair[0]]
    }
}

fn dedup_pair<T: PartialEq + Copy>(pair: [T; 2]) -> Vec<T> {
    if pair[0] == pair[1] {
        vec![pair[0]]
    } else {
        pair.to_vec()
    }
}
