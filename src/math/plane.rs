use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// Epsilon-tolerant classification of a point against a cutting plane.
///
/// Clipping discards the side the plane normal points toward, so a point
/// beyond the plane is `Dead`, a point within epsilon of it is `OnPlane`
/// and a point on the kept side is `Alive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Planarity {
    Dead,
    OnPlane,
    Alive,
}

/// A half-space boundary: unit normal plus signed distance from the origin.
///
/// The plane is the set of points `p` with `normal · p = dist`. The
/// normal faces outward: clipping by this plane removes everything the
/// normal points toward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3,
    pub dist: f64,
}

impl Plane {
    /// Creates a plane from a normal and a signed distance.
    ///
    /// The normal is assumed to be unit length; distances computed from a
    /// non-unit normal are scaled accordingly.
    #[must_use]
    pub fn new(normal: Vector3, dist: f64) -> Self {
        Self { normal, dist }
    }

    /// Creates a plane from a point lying on it and an outward normal.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal is zero-length.
    pub fn from_point_normal(point: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;
        Ok(Self {
            normal,
            dist: normal.dot(&point.coords),
        })
    }

    /// Signed distance from the point to the plane, positive on the
    /// discarded (normal) side.
    #[must_use]
    pub fn distance_to(&self, point: &Point3) -> f64 {
        self.normal.dot(&point.coords) - self.dist
    }

    /// Classifies a point against this plane with the given epsilon band.
    #[must_use]
    pub fn classify(&self, point: &Point3, epsilon: f64) -> Planarity {
        Planarity::from_distance(self.distance_to(point), epsilon)
    }

    /// The same plane with its half-space flipped.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            dist: -self.dist,
        }
    }

    /// The plane translated by `offset`, keeping its normal.
    ///
    /// Used by the re-centering shift: a point `p` satisfies the shifted
    /// plane exactly when `p - offset` satisfied the original.
    #[must_use]
    pub fn translated(&self, offset: &Vector3) -> Self {
        Self {
            normal: self.normal,
            dist: self.dist + self.normal.dot(offset),
        }
    }
}

impl Planarity {
    /// Classification from an already-computed signed distance.
    #[must_use]
    pub fn from_distance(distance: f64, epsilon: f64) -> Self {
        if distance > epsilon {
            Planarity::Dead
        } else if distance >= -epsilon {
            Planarity::OnPlane
        } else {
            Planarity::Alive
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn distance_is_signed() {
        let plane = Plane::new(Vector3::new(1.0, 0.0, 0.0), 2.0);
        assert_relative_eq!(plane.distance_to(&Point3::new(5.0, 1.0, 1.0)), 3.0);
        assert_relative_eq!(plane.distance_to(&Point3::new(-1.0, 0.0, 0.0)), -3.0);
    }

    #[test]
    fn classification_bands() {
        let plane = Plane::new(Vector3::new(0.0, 0.0, 1.0), 1.0);
        assert_eq!(plane.classify(&Point3::new(0.0, 0.0, 2.0), 0.01), Planarity::Dead);
        assert_eq!(plane.classify(&Point3::new(0.0, 0.0, 1.005), 0.01), Planarity::OnPlane);
        assert_eq!(plane.classify(&Point3::new(0.0, 0.0, 0.995), 0.01), Planarity::OnPlane);
        assert_eq!(plane.classify(&Point3::new(0.0, 0.0, 0.0), 0.01), Planarity::Alive);
    }

    #[test]
    fn from_point_normal_normalizes() {
        let plane =
            Plane::from_point_normal(Point3::new(0.0, 3.0, 0.0), Vector3::new(0.0, 2.0, 0.0))
                .unwrap();
        assert_relative_eq!(plane.normal.norm(), 1.0);
        assert_relative_eq!(plane.dist, 3.0);
    }

    #[test]
    fn zero_normal_is_rejected() {
        assert!(
            Plane::from_point_normal(Point3::origin(), Vector3::new(0.0, 0.0, 0.0)).is_err()
        );
    }

    #[test]
    fn translated_tracks_points() {
        let plane = Plane::new(Vector3::new(1.0, 0.0, 0.0), 2.0);
        let offset = Vector3::new(10.0, -4.0, 7.0);
        let shifted = plane.translated(&offset);
        let p = Point3::new(2.0, 5.0, -1.0);
        let q = p + offset;
        assert_relative_eq!(plane.distance_to(&p), shifted.distance_to(&q));
    }
}
