//! Local illumination: shadows, attenuation, diffuse and specular terms.
//!
//! Colors are linear floats on the 0-255 scale of the scene's 8-bit
//! surface colors multiplied by light intensities.

use std::f32::consts::PI;

use prism_core::{Light, LightKind, Primitive, Rgb8, Scene, Shape, Texture};
use prism_math::{from_points, normalize, reflect, Ray, Vec3};

use crate::intersect::{nearest_hit, Hittable};
use crate::{Color, RenderError, RenderResult};

/// Fixed Phong exponent of the specular highlight.
pub const PHONG_EXPONENT: i32 = 20;

/// Tile period of a plane texture along its first basis vector.
pub const PLANE_TILE_U: f32 = 70.0;
/// Tile period of a plane texture along its second basis vector.
pub const PLANE_TILE_V: f32 = 50.0;
/// World-to-texel scale applied to plane coordinates after tiling.
pub const PLANE_TEXEL_SCALE: f32 = 50.0;

/// Fixed second basis vector for plane texture coordinates.
const PLANE_BASIS_V: Vec3 = Vec3::new(0.0, 1.0, 1.0);

#[inline]
pub fn rgb8_to_color(rgb: Rgb8) -> Color {
    Color::new(rgb[0] as f32, rgb[1] as f32, rgb[2] as f32)
}

/// Radial attenuation `1 / (a2·d² + a1·d + a0)`.
///
/// A zero denominator gives 0 and an infinite distance gives 1.
pub fn radial(a2: f32, a1: f32, a0: f32, d: f32) -> f32 {
    let denom = a2 * d * d + a1 * d + a0;
    if denom == 0.0 {
        return 0.0;
    }
    if d == f32::INFINITY {
        return 1.0;
    }
    1.0 / denom
}

/// Angular attenuation of `light` toward unit direction `v_obj`.
///
/// Point lights always give 1. Spot lights give 0 outside the cone and
/// `cos^angular_a0` inside it.
pub fn angular(light: &Light, v_obj: Vec3) -> RenderResult<f32> {
    match light.kind {
        LightKind::Point => Ok(1.0),
        LightKind::Spot(cone) => {
            let cos = v_obj.dot(normalize(cone.direction)?);
            if cos < cone.cosine() {
                Ok(0.0)
            } else {
                Ok(cos.powf(cone.angular_a0))
            }
        }
    }
}

/// Texel-space coordinates of `point` on `primitive`.
pub fn texture_uv(primitive: &Primitive, texture: &Texture, point: Vec3) -> (f32, f32) {
    match primitive.shape {
        Shape::Sphere { radius } => {
            let d = point - primitive.position;
            let theta = (-d.z).atan2(d.x);
            let u = (theta + PI) / (2.0 * PI);
            let phi = (-d.y / radius).clamp(-1.0, 1.0).acos();
            let v = phi / PI;
            (u * texture.width as f32, v * texture.height as f32)
        }
        Shape::Plane { normal } => {
            let basis_u = PLANE_BASIS_V.cross(normal);
            let u = point.dot(basis_u).rem_euclid(PLANE_TILE_U);
            let v = point.dot(PLANE_BASIS_V).rem_euclid(PLANE_TILE_V);
            (u * PLANE_TEXEL_SCALE, v * PLANE_TEXEL_SCALE)
        }
    }
}

/// Diffuse surface color at `point`: the texel if the primitive is
/// textured, its flat diffuse color otherwise.
pub fn surface_color(scene: &Scene, index: usize, point: Vec3) -> RenderResult<Color> {
    let primitive = &scene.primitives[index];
    let Some(texture_index) = primitive.texture else {
        return Ok(rgb8_to_color(primitive.diffuse_color));
    };

    let texture = scene
        .texture_of(primitive)
        .ok_or(RenderError::MissingTexture {
            primitive: index,
            texture: texture_index,
        })?;
    let (u, v) = texture_uv(primitive, texture, point);
    Ok(rgb8_to_color(texture.texel(u, v)))
}

/// Whether `light` reaches `point` on the primitive at `index` unobstructed.
///
/// Casts from the light toward the point; the light counts only if the
/// first primitive it meets is the one being shaded.
fn is_lit(scene: &Scene, light: &Light, v_obj: Vec3, index: usize) -> bool {
    let shadow_ray = Ray::new(light.position, v_obj);
    matches!(nearest_hit(&scene.primitives, &shadow_ray, None), Some(hit) if hit.index == index)
}

/// Direct illumination at `point` on primitive `index`, seen along the unit
/// direction `ray_dir`, summed over every light in the scene.
pub fn direct_illumination(
    scene: &Scene,
    point: Vec3,
    ray_dir: Vec3,
    index: usize,
) -> RenderResult<Color> {
    let primitive = &scene.primitives[index];
    let normal = primitive.normal_at(point)?;
    let view = -ray_dir;
    let specular_color = rgb8_to_color(primitive.specular_color);

    let mut color = Color::ZERO;

    for light in &scene.lights {
        let v_obj = normalize(from_points(light.position, point))?;
        if !is_lit(scene, light, v_obj, index) {
            continue;
        }

        let distance = light.position.distance(point);
        let f_rad = radial(light.radial.a2, light.radial.a1, light.radial.a0, distance);
        let f_ang = angular(light, v_obj)?;

        let n_dot_l = normal.dot(-v_obj).max(0.0);
        let diffuse = surface_color(scene, index, point)? * light.color * n_dot_l;

        let r = reflect(v_obj, normal)?;
        let highlight = r.dot(view).max(0.0).powi(PHONG_EXPONENT);
        let specular = specular_color * light.color * highlight;

        color += (diffuse + specular) * f_rad * f_ang;
    }

    Ok(color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::{Camera, Radial, SpotCone};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_radial() {
        assert_eq!(radial(0.0, 0.0, 1.0, 10.0), 1.0);
        assert!(approx(radial(1.0, 0.0, 0.0, 2.0), 0.25));
        assert!(approx(radial(0.0, 1.0, 1.0, 3.0), 0.25));
    }

    #[test]
    fn test_radial_zero_denominator_is_zero() {
        assert_eq!(radial(0.0, 0.0, 0.0, 5.0), 0.0);
    }

    #[test]
    fn test_radial_infinite_distance_is_one() {
        assert_eq!(radial(1.0, 1.0, 1.0, f32::INFINITY), 1.0);
    }

    #[test]
    fn test_angular_point_light() {
        let light = Light::point(Vec3::ZERO, Vec3::ONE);
        assert_eq!(angular(&light, Vec3::X).unwrap(), 1.0);
    }

    #[test]
    fn test_angular_spot_light() {
        let cone = SpotCone::new(45.0, Vec3::new(0.0, -2.0, 0.0), 2.0);
        let light = Light::spot(Vec3::ZERO, Vec3::ONE, cone);

        // Straight down the axis.
        assert!(approx(angular(&light, Vec3::NEG_Y).unwrap(), 1.0));

        // 30 degrees off axis, inside the 45 degree cone.
        let inside = Vec3::new(0.5, -(3.0f32.sqrt()) / 2.0, 0.0);
        assert!(approx(angular(&light, inside).unwrap(), 0.75));

        // 60 degrees off axis, outside.
        let outside = Vec3::new(3.0f32.sqrt() / 2.0, -0.5, 0.0);
        assert_eq!(angular(&light, outside).unwrap(), 0.0);
    }

    #[test]
    fn test_angular_zero_direction_fails() {
        let light = Light::spot(Vec3::ZERO, Vec3::ONE, SpotCone::new(30.0, Vec3::ZERO, 1.0));
        assert!(matches!(
            angular(&light, Vec3::NEG_Y),
            Err(RenderError::Degenerate(_))
        ));
    }

    #[test]
    fn test_sphere_uv_resolving_to_first_texel() {
        let texture = Texture::new(
            2,
            2,
            vec![11, 22, 33, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            "<uv>",
        )
        .unwrap();
        let sphere = Primitive::sphere(Vec3::new(0.0, 0.0, -5.0), 1.0).with_texture(0);

        // Upper hemisphere, facing +z: u lands in column 0 and
        // floor(height - v) in row 0.
        let point = Vec3::new(0.0, 0.6, -4.2);
        let (u, v) = texture_uv(&sphere, &texture, point);
        assert!(approx(u, 0.5));
        assert!(v > 1.0 && v <= 2.0);
        assert_eq!(texture.texel(u, v), [11, 22, 33]);
    }

    #[test]
    fn test_plane_uv_is_tiled() {
        let texture = Texture::solid_color([1, 2, 3]);
        let plane = Primitive::plane(Vec3::new(0.0, -1.0, 0.0), Vec3::Y).with_texture(0);

        let a = texture_uv(&plane, &texture, Vec3::new(0.3, -1.0, -2.0));
        let b = texture_uv(&plane, &texture, Vec3::new(0.3 + PLANE_TILE_U, -1.0, -2.0));
        assert!((a.0 - b.0).abs() < 0.01);
        assert!((a.1 - b.1).abs() < 0.01);

        let (u, v) = texture_uv(&plane, &texture, Vec3::new(-123.0, -1.0, -456.0));
        assert!((0.0..PLANE_TILE_U * PLANE_TEXEL_SCALE).contains(&u));
        assert!((0.0..=PLANE_TILE_V * PLANE_TEXEL_SCALE).contains(&v));
    }

    fn lit_sphere_scene(light: Light) -> Scene {
        let mut scene = Scene::new(Camera::new(1.0, 1.0));
        scene.add_primitive(
            Primitive::sphere(Vec3::new(0.0, 0.0, -5.0), 1.0).with_diffuse([200, 100, 50]),
        );
        scene.add_light(light);
        scene
    }

    #[test]
    fn test_direct_illumination_head_on() {
        let scene = lit_sphere_scene(Light::point(Vec3::new(0.0, 0.0, -2.0), Vec3::ONE));

        let color = direct_illumination(&scene, Vec3::new(0.0, 0.0, -4.0), Vec3::NEG_Z, 0).unwrap();
        assert!(approx(color.x, 200.0));
        assert!(approx(color.y, 100.0));
        assert!(approx(color.z, 50.0));
    }

    #[test]
    fn test_direct_illumination_applies_radial_attenuation() {
        let light = Light::point(Vec3::new(0.0, 0.0, -2.0), Vec3::ONE)
            .with_radial(Radial::new(0.0, 0.0, 1.0));
        let scene = lit_sphere_scene(light);

        // Light is 2 units away: 1 / 2².
        let color = direct_illumination(&scene, Vec3::new(0.0, 0.0, -4.0), Vec3::NEG_Z, 0).unwrap();
        assert!(approx(color.x, 50.0));
    }

    #[test]
    fn test_direct_illumination_includes_specular() {
        let mut scene = lit_sphere_scene(Light::point(Vec3::new(0.0, 0.0, -2.0), Vec3::ONE));
        scene.primitives[0].diffuse_color = [0, 0, 0];
        scene.primitives[0].specular_color = [100, 100, 100];

        // Light, viewer and normal all aligned: R·V == 1.
        let color = direct_illumination(&scene, Vec3::new(0.0, 0.0, -4.0), Vec3::NEG_Z, 0).unwrap();
        assert!(approx(color.x, 100.0));
    }

    #[test]
    fn test_occluded_light_contributes_nothing() {
        let mut scene = lit_sphere_scene(Light::point(Vec3::new(0.0, 0.0, -1.0), Vec3::ONE));
        scene.add_primitive(Primitive::sphere(Vec3::new(0.0, 0.0, -2.5), 0.5));

        let color = direct_illumination(&scene, Vec3::new(0.0, 0.0, -4.0), Vec3::NEG_Z, 0).unwrap();
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_light_behind_surface_gives_no_diffuse() {
        // Light on the far side of the sphere. The shadow ray reaches the
        // same sphere, but the visible face points away from the light.
        let scene = lit_sphere_scene(Light::point(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE));
        let color = direct_illumination(&scene, Vec3::new(0.0, 0.0, -4.0), Vec3::NEG_Z, 0).unwrap();
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_textured_surface_color() {
        let mut scene = Scene::new(Camera::new(1.0, 1.0));
        let texture = scene.add_texture(Texture::solid_color([0, 255, 0]));
        scene.add_primitive(
            Primitive::sphere(Vec3::new(0.0, 0.0, -5.0), 1.0)
                .with_diffuse([255, 0, 0])
                .with_texture(texture),
        );

        let color = surface_color(&scene, 0, Vec3::new(0.0, 0.0, -4.0)).unwrap();
        assert_eq!(color, Color::new(0.0, 255.0, 0.0));
    }

    #[test]
    fn test_missing_texture_is_an_error() {
        let mut scene = Scene::new(Camera::new(1.0, 1.0));
        scene.add_primitive(Primitive::sphere(Vec3::new(0.0, 0.0, -5.0), 1.0).with_texture(2));

        assert!(matches!(
            surface_color(&scene, 0, Vec3::new(0.0, 0.0, -4.0)),
            Err(RenderError::MissingTexture {
                primitive: 0,
                texture: 2
            })
        ));
    }
}
