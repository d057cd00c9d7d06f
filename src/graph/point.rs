use crate::math::{Planarity, Point3};

use super::LineKey;

slotmap::new_key_type! {
    /// Unique identifier for a point in the working graph.
    pub struct PointKey;
}

/// A vertex of the working graph.
///
/// The `planarity` and `distance` fields are scratch state, valid only
/// during the current cut pass; every pass overwrites them for every live
/// point before reading them.
#[derive(Debug, Clone)]
pub struct WorkingPoint {
    /// Position in the (possibly re-centered) working space.
    pub position: Point3,
    /// Incident lines, unordered.
    pub fan: Vec<LineKey>,
    /// Scratch classification against the current cutting plane.
    pub planarity: Planarity,
    /// Scratch signed distance to the current cutting plane.
    pub distance: f64,
}

impl WorkingPoint {
    /// Creates a point with an empty fan.
    #[must_use]
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            fan: Vec::new(),
            planarity: Planarity::Alive,
            distance: 0.0,
        }
    }
}
