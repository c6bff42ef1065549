//! Ray-surface intersection for spheres and planes.
//!
//! The low-level tests return the signed ray parameter of the candidate
//! root, or [`NO_HIT`] when no real root exists. A negative result means the
//! surface is behind the ray origin; callers decide what to do with it.

use prism_core::{Primitive, Shape};
use prism_math::{normalize, Ray, Vec3, VectorResult};

/// Returned when a ray has no intersection with a surface.
pub const NO_HIT: f32 = -1.0;

/// Intersect a unit-direction ray with a sphere.
///
/// Takes the nearer root if it lies in front of the origin, otherwise the
/// farther one (origin inside the sphere). The farther root can still be
/// negative when the whole sphere is behind the origin.
pub fn sphere_intersect(ray: &Ray, center: Vec3, radius: f32) -> f32 {
    let oc = ray.origin - center;
    let b = 2.0 * ray.direction.dot(oc);
    let c = oc.length_squared() - radius * radius;

    let discriminant = b * b - 4.0 * c;
    if discriminant < 0.0 {
        return NO_HIT;
    }

    let sqrtd = discriminant.sqrt();
    let t0 = (-b - sqrtd) / 2.0;
    if t0 > 0.0 {
        t0
    } else {
        (-b + sqrtd) / 2.0
    }
}

/// Intersect a ray with a plane through `point`.
///
/// Rays travelling along the normal side (`normal · direction > 0`) miss,
/// and so do rays parallel to the plane. The result may be negative; it is
/// not clamped.
pub fn plane_intersect(ray: &Ray, point: Vec3, normal: Vec3) -> f32 {
    let vd = normal.dot(ray.direction);
    if vd >= 0.0 {
        return NO_HIT;
    }
    normal.dot(point - ray.origin) / vd
}

/// Trait for surfaces that can be hit by rays.
pub trait Hittable {
    /// Signed distance along `ray` to the surface, [`NO_HIT`] on a miss.
    fn intersect(&self, ray: &Ray) -> f32;

    /// Unit outward normal at a point on the surface.
    fn normal_at(&self, point: Vec3) -> VectorResult<Vec3>;
}

impl Hittable for Primitive {
    fn intersect(&self, ray: &Ray) -> f32 {
        match self.shape {
            Shape::Sphere { radius } => sphere_intersect(ray, self.position, radius),
            Shape::Plane { normal } => plane_intersect(ray, self.position, normal),
        }
    }

    fn normal_at(&self, point: Vec3) -> VectorResult<Vec3> {
        match self.shape {
            Shape::Sphere { .. } => normalize(point - self.position),
            Shape::Plane { normal } => normalize(normal),
        }
    }
}

/// Record of the nearest ray-primitive intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Index of the primitive in the scene's list
    pub index: usize,
    /// Ray parameter of the intersection
    pub t: f32,
    /// Point of intersection
    pub point: Vec3,
}

/// Find the nearest finite, non-negative intersection of `ray` with `primitives`,
/// skipping the primitive at index `exclude`.
///
/// Ties keep the earliest primitive in list order.
pub fn nearest_hit(primitives: &[Primitive], ray: &Ray, exclude: Option<usize>) -> Option<Hit> {
    let mut closest: Option<(usize, f32)> = None;

    for (index, primitive) in primitives.iter().enumerate() {
        if exclude == Some(index) {
            continue;
        }

        let t = primitive.intersect(ray);
        if t < 0.0 || !t.is_finite() {
            continue;
        }

        match closest {
            Some((_, best)) if t >= best => {}
            _ => closest = Some((index, t)),
        }
    }

    closest.map(|(index, t)| Hit {
        index,
        t,
        point: ray.at(t),
    })
}
