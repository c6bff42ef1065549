//! Image synthesis driver.
//!
//! Implements the per-pixel loop:
//! - One primary ray through the center of each pixel
//! - Nearest-hit search over the whole scene
//! - Recursive shading from depth 0, black on a miss
//! - Truncate-and-clamp conversion to 8-bit RGB

use std::path::Path;
use std::time::Instant;

use prism_core::ppm::{self, PpmEncoding, PpmResult};
use prism_core::{Camera, Rgb8, Scene};
use prism_math::{Ray, Vec3, VectorResult};
use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::integrator::shade;
use crate::intersect::nearest_hit;
use crate::{Color, RenderError, RenderResult};

/// Deepest bounce that still traces a reflection ray.
pub const DEFAULT_MAX_DEPTH: u32 = 7;

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Output width in pixels
    pub image_width: u32,
    /// Output height in pixels
    pub image_height: u32,
    /// Maximum reflection depth; deeper bounces contribute black
    pub max_depth: u32,
    /// Edge length of a square bucket in pixels
    pub bucket_size: u32,
    /// Render buckets on the rayon thread pool
    pub parallel: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_width: 512,
            image_height: 512,
            max_depth: DEFAULT_MAX_DEPTH,
            bucket_size: DEFAULT_BUCKET_SIZE,
            parallel: true,
        }
    }
}

impl RenderConfig {
    /// Builder: set output resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }
}

/// Primary ray from the origin through the center of pixel `(col, row)`.
///
/// Row 0 is the top of the image, so view-plane Y is flipped.
pub fn primary_ray(camera: &Camera, width: u32, height: u32, col: u32, row: u32) -> VectorResult<Ray> {
    let pixel_width = camera.width / width as f32;
    let pixel_height = camera.height / height as f32;

    let x = -camera.width / 2.0 + pixel_width * (col as f32 + 0.5);
    let y = -camera.height / 2.0 + pixel_height * (row as f32 + 0.5);

    Ray::normalized(Vec3::ZERO, Vec3::new(x, -y, -1.0))
}

/// Compute the unclamped color of a single pixel.
pub fn render_pixel(scene: &Scene, col: u32, row: u32, config: &RenderConfig) -> RenderResult<Color> {
    let ray = primary_ray(
        &scene.camera,
        config.image_width,
        config.image_height,
        col,
        row,
    )?;

    match nearest_hit(&scene.primitives, &ray, None) {
        Some(hit) => shade(scene, hit.point, ray.direction, hit.index, 0, config),
        None => Ok(Color::ZERO),
    }
}

/// Convert a color to 8-bit RGB: each channel is truncated, then clamped.
pub fn color_to_rgb8(color: Color) -> Rgb8 {
    let channel = |c: f32| (c as i32).clamp(0, 255) as u8;
    [channel(color.x), channel(color.y), channel(color.z)]
}

/// RGB8 output raster, row-major from the top-left pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; ppm::rgb_len(width, height)],
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Rgb8 {
        let i = self.offset(x, y);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, rgb: Rgb8) {
        let i = self.offset(x, y);
        self.pixels[i..i + 3].copy_from_slice(&rgb);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Write the image as a PPM file.
    pub fn save_ppm<P: AsRef<Path>>(&self, path: P, encoding: PpmEncoding) -> PpmResult<()> {
        ppm::write_ppm(path, self.width, self.height, &self.pixels, encoding)
    }

    fn blit(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, rgb) in result.pixels.iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            self.set(bucket.x + local_x, bucket.y + local_y, *rgb);
        }
    }
}

/// Render the entire scene to an image buffer.
///
/// The scene is validated first. Any degenerate geometry met while tracing
/// aborts the whole render.
pub fn render(scene: &Scene, config: &RenderConfig) -> RenderResult<ImageBuffer> {
    let (width, height) = (config.image_width, config.image_height);
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidResolution { width, height });
    }
    scene.validate()?;

    let buckets = generate_buckets(width, height, config.bucket_size);
    log::info!(
        "Rendering {}x{} ({} buckets, max depth {}, {})",
        width,
        height,
        buckets.len(),
        config.max_depth,
        if config.parallel { "parallel" } else { "single-threaded" }
    );

    let start = Instant::now();
    let results: Vec<BucketResult> = if config.parallel {
        buckets
            .par_iter()
            .map(|bucket| render_bucket(bucket, scene, config))
            .collect::<RenderResult<_>>()?
    } else {
        buckets
            .iter()
            .map(|bucket| render_bucket(bucket, scene, config))
            .collect::<RenderResult<_>>()?
    };

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        image.blit(result);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    Ok(image)
}
