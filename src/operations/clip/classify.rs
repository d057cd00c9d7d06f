//! Per-pass point classification and the dead-region walk.
//!
//! Every cut pass starts here: each live point's signed distance to the
//! cutting plane is computed once and banded into ALIVE / ONPLANE / DEAD,
//! then an iterative walk over the dead region derives a planarity for
//! every line it touches. The walk, not a global line sweep, is what
//! guarantees a single consistent cut boundary: ALIVE territory is never
//! reached through DEAD points, and the ONPLANE continuation of the walk
//! never re-enters DEAD territory.

use slotmap::SecondaryMap;

use crate::graph::{GraphStore, LineKey, LinePlanarity, PointKey};
use crate::math::{Plane, Planarity};

/// Outcome of classifying the graph against one cutting plane.
#[derive(Debug)]
pub(super) enum PassOutcome {
    /// No point is dead; the pass is a no-op.
    Untouched,
    /// No point is alive; the whole shape is void.
    Emptied,
    /// The plane cuts: these sets drive the surgery.
    Cut(CutSets),
}

/// Line sets discovered by the dead-region walk.
#[derive(Debug, Default)]
pub(super) struct CutSets {
    /// Dead points, i.e. every point the walk visited on the dead side.
    pub dead_points: Vec<PointKey>,
    /// Lines with a dead endpoint and no alive endpoint; all die.
    pub dead_lines: Vec<LineKey>,
    /// Lines crossing the plane (one dead, one alive endpoint).
    pub cut_lines: Vec<LineKey>,
}

/// Classifies all points and lines against `plane`.
///
/// On the `Cut` outcome, every line planarity in the store is valid:
/// `Dead`, `Cut` or `OnPlane` where the walk reached it, `Alive`
/// elsewhere. Point planarities and scratch distances are valid for all
/// points.
pub(super) fn classify_against_plane(
    store: &mut GraphStore,
    plane: &Plane,
    epsilon: f64,
) -> PassOutcome {
    let mut alive = 0usize;
    let mut dead = 0usize;
    let mut seed: Option<(PointKey, f64)> = None;

    for (key, point) in store.points_mut() {
        let distance = plane.normal.dot(&point.position.coords) - plane.dist;
        point.distance = distance;
        point.planarity = Planarity::from_distance(distance, epsilon);
        match point.planarity {
            Planarity::Dead => {
                dead += 1;
                // Seed the walk from the most-dead point.
                if seed.is_none_or(|(_, best)| distance > best) {
                    seed = Some((key, distance));
                }
            }
            Planarity::Alive => alive += 1,
            Planarity::OnPlane => {}
        }
    }

    if dead == 0 {
        return PassOutcome::Untouched;
    }
    if alive == 0 {
        return PassOutcome::Emptied;
    }

    for (_, line) in store.lines_mut() {
        line.planarity = LinePlanarity::Alive;
        line.fresh = false;
    }

    let mut sets = CutSets::default();
    let mut visited: SecondaryMap<PointKey, ()> = SecondaryMap::new();
    let mut stack: Vec<PointKey> = Vec::new();

    let Some((seed, _)) = seed else {
        return PassOutcome::Untouched;
    };
    visited.insert(seed, ());
    stack.push(seed);

    while let Some(current) = stack.pop() {
        let current_planarity = store.point(current).planarity;
        if current_planarity == Planarity::Dead {
            sets.dead_points.push(current);
        }

        let fan = store.point(current).fan.clone();
        for line_key in fan {
            let other = store.line(line_key).other_point(current);
            let other_planarity = store.point(other).planarity;

            match current_planarity {
                Planarity::Dead => match other_planarity {
                    // The line dies whether the far end is dead or merely
                    // on the plane; only the latter continues the walk
                    // under on-plane rules.
                    Planarity::Dead | Planarity::OnPlane => {
                        if store.line(line_key).planarity != LinePlanarity::Dead {
                            store.line_mut(line_key).planarity = LinePlanarity::Dead;
                            sets.dead_lines.push(line_key);
                        }
                        if visited.insert(other, ()).is_none() {
                            stack.push(other);
                        }
                    }
                    Planarity::Alive => {
                        if store.line(line_key).planarity != LinePlanarity::Cut {
                            store.line_mut(line_key).planarity = LinePlanarity::Cut;
                            sets.cut_lines.push(line_key);
                        }
                    }
                },
                Planarity::OnPlane => {
                    // On-plane continuation: only other on-plane points
                    // are walked, never back into dead territory. Dead
                    // neighbors mark this line from their own side.
                    if other_planarity == Planarity::OnPlane {
                        if store.line(line_key).planarity == LinePlanarity::Alive {
                            store.line_mut(line_key).planarity = LinePlanarity::OnPlane;
                        }
                        if visited.insert(other, ()).is_none() {
                            stack.push(other);
                        }
                    }
                }
                Planarity::Alive => {
                    debug_assert!(false, "walk reached an alive point");
                }
            }
        }
    }

    // A convex solid has one connected dead region; the walk must have
    // found every dead point.
    debug_assert_eq!(sets.dead_points.len(), dead, "disconnected dead region");

    PassOutcome::Cut(sets)
}
