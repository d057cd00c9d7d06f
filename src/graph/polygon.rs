use crate::math::Vector3;

use super::LineRef;

slotmap::new_key_type! {
    /// Unique identifier for a polygon in the working graph.
    pub struct PolygonKey;
}

/// A face of the working graph: outward normal plus an ordered boundary
/// loop. The loop is cyclic; consecutive references share an endpoint.
#[derive(Debug, Clone)]
pub struct WorkingPolygon {
    pub normal: Vector3,
    pub boundary: Vec<LineRef>,
}

impl WorkingPolygon {
    /// Creates a polygon with an empty boundary, to be threaded by the
    /// caller.
    #[must_use]
    pub fn new(normal: Vector3) -> Self {
        Self {
            normal,
            boundary: Vec::new(),
        }
    }
}
