//! Scene model for Prism.
//!
//! A scene is plain data: a camera window, an ordered list of primitives,
//! an unordered list of lights and the texture rasters the primitives refer
//! to. It is built once by the loader and only read while rendering.

use prism_math::Vec3;
use thiserror::Error;

use crate::texture::Texture;

/// 8-bit RGB channel triple (0-255 per channel).
pub type Rgb8 = [u8; 3];

/// Errors found while validating a scene before rendering.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("primitive {index} references texture {texture}, but only {available} textures are loaded")]
    MissingTexture {
        index: usize,
        texture: usize,
        available: usize,
    },

    #[error("sphere {index} has invalid radius {radius} (must be finite and > 0)")]
    InvalidRadius { index: usize, radius: f32 },

    #[error("plane {index} has a zero-length normal")]
    DegenerateNormal { index: usize },

    #[error("camera window {width}x{height} must be finite and positive")]
    InvalidCamera { width: f32, height: f32 },
}

pub type SceneResult<T> = Result<T, SceneError>;

/// The camera sits at the origin looking down -Z, with a view window of
/// `width` x `height` world units at z = -1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub width: f32,
    pub height: f32,
}

impl Camera {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Variant-specific geometry of a primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    /// `normal` is not required to be unit length; consumers normalize it.
    Plane { normal: Vec3 },
}

/// A renderable surface.
///
/// `position` is the sphere center or any point on the plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    pub position: Vec3,
    pub diffuse_color: Rgb8,
    pub specular_color: Rgb8,
    /// Blend factor between local shading and the mirrored environment.
    /// Intended to lie in [0, 1]; not checked.
    pub reflectivity: f32,
    /// Index into [`Scene::textures`].
    pub texture: Option<usize>,
}

impl Primitive {
    fn with_shape(shape: Shape, position: Vec3) -> Self {
        Self {
            shape,
            position,
            diffuse_color: [0, 0, 0],
            specular_color: [0, 0, 0],
            reflectivity: 0.0,
            texture: None,
        }
    }

    /// Create a black, non-reflective sphere.
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::with_shape(Shape::Sphere { radius }, center)
    }

    /// Create a black, non-reflective plane through `point`.
    pub fn plane(point: Vec3, normal: Vec3) -> Self {
        Self::with_shape(Shape::Plane { normal }, point)
    }

    pub fn with_diffuse(mut self, color: Rgb8) -> Self {
        self.diffuse_color = color;
        self
    }

    pub fn with_specular(mut self, color: Rgb8) -> Self {
        self.specular_color = color;
        self
    }

    pub fn with_reflectivity(mut self, reflectivity: f32) -> Self {
        self.reflectivity = reflectivity;
        self
    }

    pub fn with_texture(mut self, texture: usize) -> Self {
        self.texture = Some(texture);
        self
    }
}

/// Cone of a spot light.
///
/// `theta` and its cosine are kept together; the only way to change the
/// angle is [`SpotCone::set_theta`], which recomputes the cosine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotCone {
    theta: f32,
    cosine: f32,
    /// Direction the cone points along.
    pub direction: Vec3,
    /// Exponent of the cosine falloff inside the cone.
    pub angular_a0: f32,
}

impl SpotCone {
    /// Create a cone with half-angle `theta` in degrees.
    pub fn new(theta: f32, direction: Vec3, angular_a0: f32) -> Self {
        Self {
            theta,
            cosine: theta.to_radians().cos(),
            direction,
            angular_a0,
        }
    }

    /// Half-angle in degrees.
    pub fn theta(&self) -> f32 {
        self.theta
    }

    /// Cosine of the half-angle.
    pub fn cosine(&self) -> f32 {
        self.cosine
    }

    pub fn set_theta(&mut self, theta: f32) {
        self.theta = theta;
        self.cosine = theta.to_radians().cos();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Point,
    Spot(SpotCone),
}

/// Radial attenuation coefficients: `1 / (a2·d² + a1·d + a0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Radial {
    pub a0: f32,
    pub a1: f32,
    pub a2: f32,
}

impl Radial {
    pub fn new(a0: f32, a1: f32, a2: f32) -> Self {
        Self { a0, a1, a2 }
    }
}

impl Default for Radial {
    /// No falloff with distance.
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }
}

/// A point or spot light.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Per-channel intensity; not clamped.
    pub color: Vec3,
    pub position: Vec3,
    pub radial: Radial,
    pub kind: LightKind,
}

impl Light {
    pub fn point(position: Vec3, color: Vec3) -> Self {
        Self {
            color,
            position,
            radial: Radial::default(),
            kind: LightKind::Point,
        }
    }

    pub fn spot(position: Vec3, color: Vec3, cone: SpotCone) -> Self {
        Self {
            kind: LightKind::Spot(cone),
            ..Self::point(position, color)
        }
    }

    pub fn with_radial(mut self, radial: Radial) -> Self {
        self.radial = radial;
        self
    }

    pub fn is_spot(&self) -> bool {
        matches!(self.kind, LightKind::Spot(_))
    }
}

/// Everything needed to render one image.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    /// Order matters: on equal hit distances the earlier primitive wins.
    pub primitives: Vec<Primitive>,
    pub lights: Vec<Light>,
    pub textures: Vec<Texture>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            primitives: Vec::new(),
            lights: Vec::new(),
            textures: Vec::new(),
        }
    }

    /// Add a primitive and return its index.
    pub fn add_primitive(&mut self, primitive: Primitive) -> usize {
        self.primitives.push(primitive);
        self.primitives.len() - 1
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Add a texture and return the index primitives use to refer to it.
    pub fn add_texture(&mut self, texture: Texture) -> usize {
        self.textures.push(texture);
        self.textures.len() - 1
    }

    /// Look up the texture a primitive refers to, if any.
    pub fn texture_of(&self, primitive: &Primitive) -> Option<&Texture> {
        primitive.texture.and_then(|index| self.textures.get(index))
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Check the invariants rendering relies on.
    pub fn validate(&self) -> SceneResult<()> {
        let Camera { width, height } = self.camera;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SceneError::InvalidCamera { width, height });
        }

        for (index, primitive) in self.primitives.iter().enumerate() {
            match primitive.shape {
                Shape::Sphere { radius } => {
                    if !(radius.is_finite() && radius > 0.0) {
                        return Err(SceneError::InvalidRadius { index, radius });
                    }
                }
                Shape::Plane { normal } => {
                    if normal.length_squared() == 0.0 {
                        return Err(SceneError::DegenerateNormal { index });
                    }
                }
            }

            if let Some(texture) = primitive.texture {
                if texture >= self.textures.len() {
                    return Err(SceneError::MissingTexture {
                        index,
                        texture,
                        available: self.textures.len(),
                    });
                }
            }
        }

        Ok(())
    }
}
