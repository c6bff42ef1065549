//! Scene description parser.
//!
//! The format is line oriented. Each entity is a kind followed by
//! comma-separated `key: value` fields:
//!
//! ```text
//! camera, width: 0.5, height: 0.5
//! sphere, diffuse_color: [1, 0, 0], position: [0, 1, -5], radius: 2
//! plane, diffuse_color: [0, 0, 1], position: [0, -1, 0], normal: [0, 1, 0], texture: floor.ppm
//! light, color: [2, 2, 2], theta: 0, radial-a2: 0.125, radial-a1: 0.125, radial-a0: 0.125, position: [1, 3, 0]
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Vector values are
//! bracketed triples. Colors on primitives are unit floats stored as
//! `floor(255 * c)`; light colors are kept as float intensities.

use prism_math::Vec3;
use thiserror::Error;

use crate::scene::{Camera, Light, LightKind, Primitive, Radial, Rgb8, SpotCone};

/// Errors that can occur while parsing a scene description.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid number '{token}' at line {line}")]
    InvalidNumber { line: usize, token: String },

    #[error("Unknown entity kind '{kind}' at line {line}")]
    UnknownKind { line: usize, kind: String },

    #[error("{kind} at line {line} is missing required field '{field}'")]
    MissingField {
        line: usize,
        kind: &'static str,
        field: &'static str,
    },

    #[error("Scene has no camera entry")]
    MissingCamera,

    #[error("Second camera entry at line {0}")]
    DuplicateCamera(usize),

    #[error("Too many primitives and lights at line {line} (limit is {limit})")]
    TooManyEntities { line: usize, limit: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Ingestion limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneLimits {
    /// Maximum number of primitives and lights combined.
    pub max_entities: usize,
}

impl Default for SceneLimits {
    fn default() -> Self {
        Self { max_entities: 128 }
    }
}

/// Parsed scene before textures are loaded.
///
/// A primitive's `texture` field indexes `texture_paths`.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDescription {
    pub camera: Camera,
    pub primitives: Vec<Primitive>,
    pub lights: Vec<Light>,
    pub texture_paths: Vec<String>,
}

/// Parse a scene description.
pub fn parse_scene(content: &str, limits: &SceneLimits) -> ParseResult<SceneDescription> {
    SceneParser::new(*limits).parse(content)
}

/// Line-by-line scene description parser.
pub struct SceneParser {
    limits: SceneLimits,
    camera: Option<Camera>,
    primitives: Vec<Primitive>,
    lights: Vec<Light>,
    texture_paths: Vec<String>,
}

impl SceneParser {
    pub fn new(limits: SceneLimits) -> Self {
        Self {
            limits,
            camera: None,
            primitives: Vec::new(),
            lights: Vec::new(),
            texture_paths: Vec::new(),
        }
    }

    /// Parse the whole description.
    pub fn parse(mut self, content: &str) -> ParseResult<SceneDescription> {
        for (index, raw) in content.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            self.parse_entity(line, trimmed)?;
        }

        let camera = self.camera.ok_or(ParseError::MissingCamera)?;
        Ok(SceneDescription {
            camera,
            primitives: self.primitives,
            lights: self.lights,
            texture_paths: self.texture_paths,
        })
    }

    fn parse_entity(&mut self, line: usize, text: &str) -> ParseResult<()> {
        let (kind, rest) = text.split_once(',').unwrap_or((text, ""));
        let kind = kind.trim();
        if self.camera.is_none() && kind != "camera" {
            return Err(ParseError::Parse {
                line,
                message: format!("'{}' declared before the camera", kind),
            });
        }
        let fields = split_fields(line, rest)?;

        match kind {
            "camera" => {
                if self.camera.is_some() {
                    return Err(ParseError::DuplicateCamera(line));
                }
                self.camera = Some(parse_camera(line, &fields)?);
            }
            "sphere" | "plane" => {
                self.check_capacity(line)?;
                let primitive = self.parse_primitive(line, kind, &fields)?;
                self.primitives.push(primitive);
            }
            "light" => {
                self.check_capacity(line)?;
                self.lights.push(parse_light(line, &fields)?);
            }
            other => {
                return Err(ParseError::UnknownKind {
                    line,
                    kind: other.to_string(),
                })
            }
        }
        Ok(())
    }

    fn check_capacity(&self, line: usize) -> ParseResult<()> {
        if self.primitives.len() + self.lights.len() >= self.limits.max_entities {
            return Err(ParseError::TooManyEntities {
                line,
                limit: self.limits.max_entities,
            });
        }
        Ok(())
    }

    fn parse_primitive(
        &mut self,
        line: usize,
        kind: &str,
        fields: &[(&str, &str)],
    ) -> ParseResult<Primitive> {
        let mut position = Vec3::ZERO;
        let mut radius = None;
        let mut normal = None;
        let mut diffuse: Rgb8 = [0, 0, 0];
        let mut specular: Rgb8 = [0, 0, 0];
        let mut reflectivity = 0.0;
        let mut texture = None;

        for &(key, value) in fields {
            match key {
                "position" => position = parse_vec3(line, value)?,
                "radius" => radius = Some(parse_f32(line, value)?),
                "normal" => normal = Some(parse_vec3(line, value)?),
                "diffuse_color" => diffuse = unit_to_rgb8(parse_vec3(line, value)?),
                "specular_color" => specular = unit_to_rgb8(parse_vec3(line, value)?),
                "reflectivity" => reflectivity = parse_f32(line, value)?,
                "texture" => {
                    if value.is_empty() {
                        return Err(ParseError::Parse {
                            line,
                            message: "empty texture path".to_string(),
                        });
                    }
                    self.texture_paths.push(value.to_string());
                    texture = Some(self.texture_paths.len() - 1);
                }
                other => log::warn!("line {}: ignoring unknown {} field '{}'", line, kind, other),
            }
        }

        let primitive = if kind == "sphere" {
            let radius = radius.ok_or(ParseError::MissingField {
                line,
                kind: "sphere",
                field: "radius",
            })?;
            Primitive::sphere(position, radius)
        } else {
            let normal = normal.ok_or(ParseError::MissingField {
                line,
                kind: "plane",
                field: "normal",
            })?;
            Primitive::plane(position, normal)
        };

        Ok(Primitive {
            texture,
            ..primitive
                .with_diffuse(diffuse)
                .with_specular(specular)
                .with_reflectivity(reflectivity)
        })
    }
}

fn parse_camera(line: usize, fields: &[(&str, &str)]) -> ParseResult<Camera> {
    let mut width = None;
    let mut height = None;

    for &(key, value) in fields {
        match key {
            "width" => width = Some(parse_f32(line, value)?),
            "height" => height = Some(parse_f32(line, value)?),
            other => log::warn!("line {}: ignoring unknown camera field '{}'", line, other),
        }
    }

    let width = width.ok_or(ParseError::MissingField {
        line,
        kind: "camera",
        field: "width",
    })?;
    let height = height.ok_or(ParseError::MissingField {
        line,
        kind: "camera",
        field: "height",
    })?;
    Ok(Camera::new(width, height))
}

fn parse_light(line: usize, fields: &[(&str, &str)]) -> ParseResult<Light> {
    let mut color = Vec3::ZERO;
    let mut position = Vec3::ZERO;
    let mut radial: [Option<f32>; 3] = [None; 3];
    let mut theta = 0.0;
    let mut angular_a0 = 0.0;
    let mut direction = None;

    for &(key, value) in fields {
        match key {
            "color" => color = parse_vec3(line, value)?,
            "position" => position = parse_vec3(line, value)?,
            "radial-a0" => radial[0] = Some(parse_f32(line, value)?),
            "radial-a1" => radial[1] = Some(parse_f32(line, value)?),
            "radial-a2" => radial[2] = Some(parse_f32(line, value)?),
            "theta" => theta = parse_f32(line, value)?,
            "angular-a0" => angular_a0 = parse_f32(line, value)?,
            "direction" => direction = Some(parse_vec3(line, value)?),
            other => log::warn!("line {}: ignoring unknown light field '{}'", line, other),
        }
    }

    // Without any coefficient the light does not fall off; otherwise the
    // unspecified ones are zero.
    let radial = if radial.iter().all(Option::is_none) {
        Radial::default()
    } else {
        Radial::new(
            radial[0].unwrap_or(0.0),
            radial[1].unwrap_or(0.0),
            radial[2].unwrap_or(0.0),
        )
    };

    let kind = if theta == 0.0 {
        LightKind::Point
    } else {
        let direction = direction.ok_or(ParseError::MissingField {
            line,
            kind: "spot light",
            field: "direction",
        })?;
        LightKind::Spot(SpotCone::new(theta, direction, angular_a0))
    };

    Ok(Light {
        color,
        position,
        radial,
        kind,
    })
}

/// Split `key: value, key: [a, b, c], ...` into trimmed pairs.
/// Commas inside brackets belong to the value.
fn split_fields(line: usize, text: &str) -> ParseResult<Vec<(&str, &str)>> {
    let mut fields = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1).ok_or_else(|| ParseError::Parse {
                    line,
                    message: "unbalanced ']'".to_string(),
                })?
            }
            ',' if depth == 0 => {
                push_field(line, &text[start..i], &mut fields)?;
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ParseError::Parse {
            line,
            message: "unclosed '['".to_string(),
        });
    }
    push_field(line, &text[start..], &mut fields)?;

    Ok(fields)
}

fn push_field<'a>(
    line: usize,
    segment: &'a str,
    fields: &mut Vec<(&'a str, &'a str)>,
) -> ParseResult<()> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Ok(());
    }
    let (key, value) = segment.split_once(':').ok_or_else(|| ParseError::Parse {
        line,
        message: format!("expected 'key: value', found '{}'", segment),
    })?;
    fields.push((key.trim(), value.trim()));
    Ok(())
}

fn parse_f32(line: usize, token: &str) -> ParseResult<f32> {
    token
        .trim()
        .parse::<f32>()
        .map_err(|_| ParseError::InvalidNumber {
            line,
            token: token.trim().to_string(),
        })
}

fn parse_vec3(line: usize, value: &str) -> ParseResult<Vec3> {
    let inner = value
        .trim()
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or_else(|| ParseError::Parse {
            line,
            message: format!("expected a bracketed vector, found '{}'", value),
        })?;

    let components = inner
        .split(',')
        .map(|token| parse_f32(line, token))
        .collect::<ParseResult<Vec<f32>>>()?;

    match components.as_slice() {
        &[x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => Err(ParseError::Parse {
            line,
            message: format!("expected 3 components, found {}", components.len()),
        }),
    }
}

/// Convert unit float channels to 0-255 with `floor(255 * c)`.
fn unit_to_rgb8(color: Vec3) -> Rgb8 {
    let channel = |c: f32| (255.0 * c).floor().clamp(0.0, 255.0) as u8;
    [channel(color.x), channel(color.y), channel(color.z)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Shape;

    const SAMPLE: &str = "\
camera, width: 0.5, height: 0.5

# a red sphere and a textured floor
sphere, diffuse_color: [1, 0, 0], specular_color: [0.5, 0.5, 0.5], position: [0, 1, -5], radius: 2, reflectivity: 0.25
plane, position: [0, -1, 0], normal: [0, 1, 0], texture: floor.ppm
light, color: [2, 2, 2], theta: 0, radial-a2: 0.125, radial-a1: 0.125, radial-a0: 0.125, position: [1, 3, 0]
light, color: [1, 1, 1], theta: 60, angular-a0: 2, direction: [0, -1, 0], position: [0, 5, -5]
";

    #[test]
    fn test_parse_sample_scene() {
        let desc = parse_scene(SAMPLE, &SceneLimits::default()).unwrap();

        assert_eq!(desc.camera, Camera::new(0.5, 0.5));
        assert_eq!(desc.primitives.len(), 2);
        assert_eq!(desc.lights.len(), 2);
        assert_eq!(desc.texture_paths, vec!["floor.ppm".to_string()]);

        let sphere = &desc.primitives[0];
        assert_eq!(sphere.shape, Shape::Sphere { radius: 2.0 });
        assert_eq!(sphere.position, Vec3::new(0.0, 1.0, -5.0));
        assert_eq!(sphere.diffuse_color, [255, 0, 0]);
        assert_eq!(sphere.specular_color, [127, 127, 127]);
        assert_eq!(sphere.reflectivity, 0.25);
        assert_eq!(sphere.texture, None);

        let plane = &desc.primitives[1];
        assert_eq!(plane.shape, Shape::Plane { normal: Vec3::Y });
        assert_eq!(plane.diffuse_color, [0, 0, 0]);
        assert_eq!(plane.texture, Some(0));

        let point = &desc.lights[0];
        assert_eq!(point.kind, LightKind::Point);
        assert_eq!(point.radial, Radial::new(0.125, 0.125, 0.125));
        assert_eq!(point.color, Vec3::new(2.0, 2.0, 2.0));

        let spot = &desc.lights[1];
        match spot.kind {
            LightKind::Spot(cone) => {
                assert_eq!(cone.theta(), 60.0);
                assert!((cone.cosine() - 0.5).abs() < 1e-6);
                assert_eq!(cone.direction, Vec3::NEG_Y);
                assert_eq!(cone.angular_a0, 2.0);
            }
            LightKind::Point => panic!("expected a spot light"),
        }
        assert_eq!(spot.radial, Radial::default());
    }

    #[test]
    fn test_missing_camera() {
        let err = parse_scene("# nothing here\n\n", &SceneLimits::default()).unwrap_err();
        assert_eq!(err, ParseError::MissingCamera);
    }

    #[test]
    fn test_camera_must_come_first() {
        let text = "sphere, radius: 1\ncamera, width: 1, height: 1\n";
        assert!(matches!(
            parse_scene(text, &SceneLimits::default()),
            Err(ParseError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_duplicate_camera() {
        let text = "camera, width: 1, height: 1\ncamera, width: 2, height: 2\n";
        let err = parse_scene(text, &SceneLimits::default()).unwrap_err();
        assert_eq!(err, ParseError::DuplicateCamera(2));
    }

    #[test]
    fn test_unknown_kind() {
        let text = "camera, width: 1, height: 1\ncube, position: [0, 0, 0]\n";
        let err = parse_scene(text, &SceneLimits::default()).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownKind {
                line: 2,
                kind: "cube".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_number() {
        let text = "camera, width: 1, height: 1\nsphere, radius: big\n";
        let err = parse_scene(text, &SceneLimits::default()).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                line: 2,
                token: "big".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_vector() {
        let limits = SceneLimits::default();

        let short = "camera, width: 1, height: 1\nsphere, radius: 1, position: [1, 2]\n";
        assert!(matches!(
            parse_scene(short, &limits),
            Err(ParseError::Parse { line: 2, .. })
        ));

        let unclosed = "camera, width: 1, height: 1\nsphere, radius: 1, position: [1, 2, 3\n";
        assert!(matches!(
            parse_scene(unclosed, &limits),
            Err(ParseError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_missing_required_fields() {
        let limits = SceneLimits::default();

        let sphere = "camera, width: 1, height: 1\nsphere, position: [0, 0, -1]\n";
        assert_eq!(
            parse_scene(sphere, &limits).unwrap_err(),
            ParseError::MissingField {
                line: 2,
                kind: "sphere",
                field: "radius"
            }
        );

        let spot = "camera, width: 1, height: 1\nlight, theta: 20\n";
        assert!(matches!(
            parse_scene(spot, &limits),
            Err(ParseError::MissingField {
                field: "direction",
                ..
            })
        ));
    }

    #[test]
    fn test_entity_limit() {
        let limits = SceneLimits { max_entities: 2 };
        let text = "\
camera, width: 1, height: 1
sphere, radius: 1
light, color: [1, 1, 1]
sphere, radius: 2
";
        assert_eq!(
            parse_scene(text, &limits).unwrap_err(),
            ParseError::TooManyEntities { line: 4, limit: 2 }
        );
    }

    #[test]
    fn test_unknown_field_is_ignored() {
        let text = "camera, width: 1, height: 1\nsphere, radius: 1, shininess: 9\n";
        let desc = parse_scene(text, &SceneLimits::default()).unwrap();
        assert_eq!(desc.primitives.len(), 1);
    }

    #[test]
    fn test_unit_to_rgb8_clamps() {
        assert_eq!(unit_to_rgb8(Vec3::new(1.5, -0.2, 0.999)), [255, 0, 254]);
    }

    #[test]
    fn test_split_fields_keeps_bracketed_commas() {
        let fields = split_fields(1, " color: [1, 2, 3], theta: 0").unwrap();
        assert_eq!(fields, vec![("color", "[1, 2, 3]"), ("theta", "0")]);
    }
}
