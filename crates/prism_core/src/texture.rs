//! Texture loading and caching for primitives.
//!
//! Textures are RGB8 rasters read from PPM files. The cache resolves paths
//! relative to the scene file and loads each distinct file once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ppm::{self, PpmError};

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    LoadError {
        path: String,
        #[source]
        source: PpmError,
    },

    #[error("Texture {path} is empty ({width}x{height})")]
    Empty {
        path: String,
        width: u32,
        height: u32,
    },

    #[error("Texture {path} has {actual} bytes, expected {expected}")]
    SizeMismatch {
        path: String,
        expected: usize,
        actual: usize,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A loaded texture with pixel data.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// RGB bytes, row-major, `width * height * 3` long
    pub pixels: Vec<u8>,

    /// Original file path (for debugging)
    pub path: String,
}

impl Texture {
    /// Create a texture from an RGB8 raster.
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        path: impl Into<String>,
    ) -> TextureResult<Self> {
        let path = path.into();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty {
                path,
                width,
                height,
            });
        }

        let expected = ppm::rgb_len(width, height);
        if pixels.len() != expected {
            return Err(TextureError::SizeMismatch {
                path,
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
            path,
        })
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: [u8; 3]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: color.to_vec(),
            path: "<solid>".to_string(),
        }
    }

    /// Fetch the texel at texel-space coordinates `(u, v)`.
    ///
    /// `u` runs along a row, `v` counts up from the bottom row, so the
    /// stored row is `floor(height - v)` and the column is `floor(u)`.
    /// Both indices wrap around the texture edges.
    pub fn texel(&self, u: f32, v: f32) -> [u8; 3] {
        let col = wrap(u.floor(), self.width);
        let row = wrap((self.height as f32 - v).floor(), self.height);
        let offset = (row * self.width as usize + col) * 3;
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        ]
    }

    /// Get total size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.pixels.len()
    }
}

/// Wrap an integral texel coordinate into `0..extent`. NaN maps to 0.
fn wrap(coord: f32, extent: u32) -> usize {
    (coord as i64).rem_euclid(extent as i64) as usize
}

/// Cache for loaded textures.
///
/// Textures are loaded on demand and stored in load order, so the index
/// returned by [`TextureCache::load`] is also the texture's index in the
/// vector returned by [`TextureCache::into_textures`].
pub struct TextureCache {
    /// Loaded textures in load order
    textures: Vec<Texture>,

    /// Index of each resolved path in `textures`
    by_path: HashMap<PathBuf, usize>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    /// Create a new empty texture cache.
    pub fn new() -> Self {
        Self {
            textures: Vec::new(),
            by_path: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
            ..Self::new()
        }
    }

    /// Load a texture from file, using the cache if available.
    /// Returns the texture's index.
    pub fn load(&mut self, path: &str) -> TextureResult<usize> {
        let full_path = self.resolve_path(path);

        if let Some(&index) = self.by_path.get(&full_path) {
            return Ok(index);
        }

        let texture = load_texture_file(&full_path)?;

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path,
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );

        let index = self.insert(full_path, texture);
        Ok(index)
    }

    fn insert(&mut self, path: PathBuf, texture: Texture) -> usize {
        self.textures.push(texture);
        let index = self.textures.len() - 1;
        self.by_path.insert(path, index);
        index
    }

    /// Get the number of cached textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Get total memory usage of cached textures.
    pub fn total_size_bytes(&self) -> usize {
        self.textures.iter().map(|t| t.size_bytes()).sum()
    }

    /// Hand the loaded textures over, in index order.
    pub fn into_textures(self) -> Vec<Texture> {
        self.textures
    }

    /// Resolve a path relative to the base directory.
    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(base) = &self.base_dir {
            base.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a texture from a PPM file.
fn load_texture_file(path: &Path) -> TextureResult<Texture> {
    let display = path.display().to_string();
    let pixmap = ppm::read_ppm(path).map_err(|source| TextureError::LoadError {
        path: display.clone(),
        source,
    })?;

    Texture::new(pixmap.width, pixmap.height, pixmap.data, display)
}
