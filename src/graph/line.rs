use super::{PointKey, PolygonKey};

slotmap::new_key_type! {
    /// Unique identifier for a line in the working graph.
    pub struct LineKey;
}

/// Scratch classification of a line against the current cutting plane,
/// derived from its endpoint planarities during the dead-region walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePlanarity {
    /// Both endpoints survive; the line is untouched.
    Alive,
    /// Both endpoints lie on the cutting plane.
    OnPlane,
    /// At least one endpoint is dead and none is alive.
    Dead,
    /// One endpoint dead, one alive: the line crosses the plane.
    Cut,
}

/// An edge of the working graph.
///
/// Slot `s` of `polygons` holds the polygon whose boundary traversal of
/// this line ends at `points[s]`; the two adjoining polygons therefore
/// occupy opposite slots and walk the line in opposite directions.
#[derive(Debug, Clone)]
pub struct WorkingLine {
    pub points: [PointKey; 2],
    pub polygons: [PolygonKey; 2],
    /// Scratch classification for the current cut pass.
    pub planarity: LinePlanarity,
    /// Created or re-lengthened during the current pass; candidate for
    /// the sub-epsilon collapse.
    pub fresh: bool,
}

impl WorkingLine {
    /// Creates a live line between two points bounded by two polygons.
    #[must_use]
    pub fn new(points: [PointKey; 2], polygons: [PolygonKey; 2]) -> Self {
        Self {
            points,
            polygons,
            planarity: LinePlanarity::Alive,
            fresh: false,
        }
    }

    /// The endpoint opposite `point`.
    #[must_use]
    pub fn other_point(&self, point: PointKey) -> PointKey {
        if self.points[0] == point {
            self.points[1]
        } else {
            self.points[0]
        }
    }

    /// The slot index (0 or 1) holding `point`, if present.
    #[must_use]
    pub fn point_slot(&self, point: PointKey) -> Option<usize> {
        self.points.iter().position(|&p| p == point)
    }

    /// The slot index (0 or 1) holding `polygon`, if present.
    #[must_use]
    pub fn polygon_slot(&self, polygon: PolygonKey) -> Option<usize> {
        self.polygons.iter().position(|&p| p == polygon)
    }
}
