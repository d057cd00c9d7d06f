pub mod error;
pub mod graph;
pub mod math;
pub mod operations;
pub mod polyhedron;

pub use error::{PolycarveError, Result};
