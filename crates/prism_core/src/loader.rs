//! High-level scene loading.
//!
//! Reads a scene description from disk, parses it, loads every texture it
//! references and validates the result, producing a [`Scene`] ready to
//! render.

use std::path::Path;

use thiserror::Error;

use crate::parser::{parse_scene, ParseError, SceneLimits};
use crate::scene::{Scene, SceneError};
use crate::texture::{TextureCache, TextureError};

/// Errors that can occur during scene loading.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("Invalid scene: {0}")]
    Scene(#[from] SceneError),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Load a scene file. Texture paths are resolved relative to the scene
/// file's directory.
///
/// # Example
///
/// ```ignore
/// use prism_core::{load_scene, SceneLimits};
///
/// let scene = load_scene("demo.scene", &SceneLimits::default())?;
/// println!("Loaded {} primitives, {} lights",
///     scene.primitive_count(),
///     scene.light_count());
/// ```
pub fn load_scene<P: AsRef<Path>>(path: P, limits: &SceneLimits) -> LoadResult<Scene> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    log::info!("Loading scene from {}", path.display());
    load_scene_from_string(&content, base_dir, limits)
}

/// Load a scene from description text, resolving texture paths against
/// `base_dir`.
pub fn load_scene_from_string<P: AsRef<Path>>(
    content: &str,
    base_dir: P,
    limits: &SceneLimits,
) -> LoadResult<Scene> {
    let description = parse_scene(content, limits)?;

    let mut cache = TextureCache::with_base_dir(base_dir.as_ref());
    let texture_ids = description
        .texture_paths
        .iter()
        .map(|texture_path| cache.load(texture_path))
        .collect::<Result<Vec<usize>, TextureError>>()?;

    let mut scene = Scene::new(description.camera);
    for mut primitive in description.primitives {
        primitive.texture = primitive.texture.map(|path_index| texture_ids[path_index]);
        scene.add_primitive(primitive);
    }
    for light in description.lights {
        scene.add_light(light);
    }
    if !cache.is_empty() {
        log::debug!(
            "Texture cache: {} rasters, {:.1} KB",
            cache.len(),
            cache.total_size_bytes() as f32 / 1024.0
        );
    }
    scene.textures = cache.into_textures();

    scene.validate()?;

    log::info!(
        "Scene ready: {} primitives, {} lights, {} textures, camera window {}x{}",
        scene.primitive_count(),
        scene.light_count(),
        scene.textures.len(),
        scene.camera.width,
        scene.camera.height
    );

    Ok(scene)
}
