use crate::{normalize, Vec3, VectorResult};

/// A ray in 3D space with an origin and a direction.
///
/// Intersection routines assume `direction` is unit length, since the
/// sphere quadratic drops its leading coefficient. Use [`Ray::toward`] or
/// [`Ray::normalized`] when the direction comes from arbitrary input.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray. `direction` is stored as given.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Create a ray with a normalized copy of `direction`.
    pub fn normalized(origin: Vec3, direction: Vec3) -> VectorResult<Self> {
        Ok(Self::new(origin, normalize(direction)?))
    }

    /// Create a unit ray starting at `origin` and passing through `target`.
    pub fn toward(origin: Vec3, target: Vec3) -> VectorResult<Self> {
        Self::normalized(origin, target - origin)
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
