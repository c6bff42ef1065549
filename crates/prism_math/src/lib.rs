// Re-export glam for convenience
pub use glam::*;

// Prism math types
mod ray;
mod vector;

pub use ray::Ray;
pub use vector::{
    angle_between, cos_angle_between, from_points, length, normalize, reflect,
    DegenerateVectorError, VectorResult,
};
