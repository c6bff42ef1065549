//! Recursive mirror reflection.
//!
//! Each bounce blends the local shading of the surface with whatever the
//! mirrored ray sees, weighted by the surface's reflectivity.

use prism_math::{reflect, Ray, Vec3};

use crate::intersect::{nearest_hit, Hittable};
use crate::shading::direct_illumination;
use crate::{Color, RenderConfig, RenderResult};

/// Color seen along unit direction `ray_dir` arriving at `point` on the
/// primitive at `index`, `depth` bounces away from the camera.
///
/// Depth 0 is the primary ray. Past `config.max_depth` the result is black.
pub fn shade(
    scene: &prism_core::Scene,
    point: Vec3,
    ray_dir: Vec3,
    index: usize,
    depth: u32,
    config: &RenderConfig,
) -> RenderResult<Color> {
    if depth > config.max_depth {
        return Ok(Color::ZERO);
    }

    let primitive = &scene.primitives[index];
    let reflectivity = primitive.reflectivity;

    let mut reflected = Color::ZERO;
    if reflectivity != 0.0 {
        let normal = primitive.normal_at(point)?;
        let bounce = Ray::new(point, reflect(ray_dir, normal)?);

        // The surface itself is skipped to avoid re-hitting it at t ≈ 0.
        if let Some(hit) = nearest_hit(&scene.primitives, &bounce, Some(index)) {
            reflected = shade(scene, hit.point, bounce.direction, hit.index, depth + 1, config)?;
        }
    }

    let direct = direct_illumination(scene, point, ray_dir, index)?;

    Ok(direct * (1.0 - reflectivity) + reflected * reflectivity)
}
