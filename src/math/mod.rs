pub mod plane;
pub mod poly_clip;

pub use plane::{Plane, Planarity};
pub use poly_clip::{clip_polygon_to_plane, polygon_in_plane};

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Default on-plane epsilon for clipping, in world units.
///
/// Points within this distance of a cutting plane are treated as lying
/// exactly on it. Deliberately coarse: brush geometry is authored on a
/// grid, and a loose band here absorbs accumulated interpolation error
/// over many sequential cuts.
pub const DEFAULT_ON_PLANE_EPSILON: f64 = 0.01;
