//! Prism Core - scene model, scene loading and pixmap I/O.
//!
//! This crate provides:
//!
//! - **Scene model**: `Scene`, `Primitive`, `Shape`, `Light`, `Camera`
//! - **Scene loading**: parsing the text scene format and loading textures
//! - **PPM codec**: P3/P6 pixmap reading and writing
//!
//! # Example
//!
//! ```ignore
//! use prism_core::{load_scene, SceneLimits};
//!
//! let scene = load_scene("demo.scene", &SceneLimits::default())?;
//! println!("Loaded {} primitives, {} lights",
//!     scene.primitive_count(),
//!     scene.light_count());
//! ```

pub mod loader;
pub mod parser;
pub mod ppm;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use loader::{load_scene, load_scene_from_string, LoadError, LoadResult};
pub use parser::{parse_scene, ParseError, SceneDescription, SceneLimits};
pub use ppm::{read_ppm, write_ppm, PpmEncoding, PpmError};
pub use scene::{
    Camera, Light, LightKind, Primitive, Radial, Rgb8, Scene, SceneError, Shape, SpotCone,
};
pub use texture::{Texture, TextureCache, TextureError};
