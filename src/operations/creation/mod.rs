//! Creation operations producing indexed polyhedra from scratch.

use crate::error::{OperationError, Result};
use crate::math::Point3;
use crate::polyhedron::Polyhedron;

/// Face loops of an axis-aligned box over the vertex ordering produced by
/// [`box_vertices`], wound so every Newell normal points outward.
const BOX_FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1], // -z
    [4, 5, 6, 7], // +z
    [0, 1, 5, 4], // -y
    [3, 7, 6, 2], // +y
    [0, 4, 7, 3], // -x
    [1, 2, 6, 5], // +x
];

/// The 8 corners of the box spanned by `mins` and `maxs`.
fn box_vertices(mins: Point3, maxs: Point3) -> Vec<Point3> {
    vec![
        Point3::new(mins.x, mins.y, mins.z),
        Point3::new(maxs.x, mins.y, mins.z),
        Point3::new(maxs.x, maxs.y, mins.z),
        Point3::new(mins.x, maxs.y, mins.z),
        Point3::new(mins.x, mins.y, maxs.z),
        Point3::new(maxs.x, mins.y, maxs.z),
        Point3::new(maxs.x, maxs.y, maxs.z),
        Point3::new(mins.x, maxs.y, maxs.z),
    ]
}

/// Creates an axis-aligned box polyhedron: 8 vertices, 12 lines,
/// 6 polygons.
///
/// This is also the seed shape for planes-only construction, which carves
/// a box sized from the loose bounds estimate down to the final solid.
#[derive(Debug, Clone)]
pub struct MakeBox {
    mins: Point3,
    maxs: Point3,
}

impl MakeBox {
    /// Creates a new box operation from two opposite corners.
    #[must_use]
    pub fn new(mins: Point3, maxs: Point3) -> Self {
        Self { mins, maxs }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the box has no extent along some axis.
    pub fn execute(&self) -> Result<Polyhedron> {
        let extent = self.maxs - self.mins;
        if extent.x <= 0.0 || extent.y <= 0.0 || extent.z <= 0.0 {
            return Err(OperationError::InvalidInput(format!(
                "box extents must be positive, got {extent:?}"
            ))
            .into());
        }

        let faces: Vec<Vec<usize>> = BOX_FACES.iter().map(|f| f.to_vec()).collect();
        Polyhedron::from_faces(box_vertices(self.mins, self.maxs), &faces)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_box() {
        let cube = MakeBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
            .execute()
            .unwrap();
        cube.validate().unwrap();
        assert_relative_eq!(cube.volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn inverted_box_is_rejected() {
        assert!(
            MakeBox::new(Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 1.0))
                .execute()
                .is_err()
        );
    }
}
