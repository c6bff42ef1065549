//! Prism renderer - CPU Whitted-style ray tracing
//!
//! Traces one primary ray per pixel from a pinhole camera at the origin,
//! shades hits with Phong-style direct lighting from point and spot lights,
//! and follows mirror reflections up to a fixed bounce depth.
//!
//! The image is split into buckets that rayon renders in parallel against
//! the read-only scene.

mod bucket;
mod integrator;
mod intersect;
mod renderer;
mod shading;

use prism_core::SceneError;
use prism_math::DegenerateVectorError;
use thiserror::Error;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use integrator::shade;
pub use intersect::{nearest_hit, plane_intersect, sphere_intersect, Hit, Hittable, NO_HIT};
pub use renderer::{
    color_to_rgb8, primary_ray, render, render_pixel, ImageBuffer, RenderConfig, DEFAULT_MAX_DEPTH,
};
pub use shading::{
    angular, direct_illumination, radial, surface_color, texture_uv, PHONG_EXPONENT,
};

/// Linear color on the 0-255 scale; channels may exceed 255 before output.
pub type Color = prism_math::Vec3;

/// Errors that abort a render.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error(transparent)]
    Degenerate(#[from] DegenerateVectorError),

    #[error("invalid scene: {0}")]
    Scene(#[from] SceneError),

    #[error("primitive {primitive} references missing texture {texture}")]
    MissingTexture { primitive: usize, texture: usize },

    #[error("output resolution {width}x{height} must be positive")]
    InvalidResolution { width: u32, height: u32 },
}

pub type RenderResult<T> = Result<T, RenderError>;
