//! Vector helpers layered on top of `glam::Vec3`.
//!
//! Addition, subtraction, scaling, dot and cross products come straight from
//! glam's operators. The functions here cover what glam either lacks or
//! handles too quietly: every operation that divides by a vector length
//! refuses a zero-length input instead of producing NaN.

use crate::Vec3;
use thiserror::Error;

/// A zero-length (or non-finite) vector was passed to an operation that
/// divides by its length.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("degenerate vector {0} cannot be normalized")]
pub struct DegenerateVectorError(pub Vec3);

pub type VectorResult<T> = Result<T, DegenerateVectorError>;

/// Displacement from `tail` to `head` (head - tail).
#[inline]
pub fn from_points(tail: Vec3, head: Vec3) -> Vec3 {
    head - tail
}

/// Euclidean length of `v`.
#[inline]
pub fn length(v: Vec3) -> f32 {
    v.length()
}

/// Unit vector in the direction of `v`.
pub fn normalize(v: Vec3) -> VectorResult<Vec3> {
    let len = v.length();
    if len == 0.0 || !len.is_finite() {
        return Err(DegenerateVectorError(v));
    }
    Ok(v / len)
}

/// Mirror `v` about `normal`: `v - 2(n·v)n`.
///
/// `normal` does not need to be unit length, a normalized copy is used.
pub fn reflect(v: Vec3, normal: Vec3) -> VectorResult<Vec3> {
    let n = normalize(normal)?;
    Ok(v - 2.0 * n.dot(v) * n)
}

/// Cosine of the angle between `a` and `b`, for comparisons that do not
/// need the angle itself.
pub fn cos_angle_between(a: Vec3, b: Vec3) -> VectorResult<f32> {
    let denom = a.length() * b.length();
    if denom == 0.0 || !denom.is_finite() {
        let degenerate = if a.length() == 0.0 { a } else { b };
        return Err(DegenerateVectorError(degenerate));
    }
    Ok(a.dot(b) / denom)
}

/// Angle between `a` and `b` in radians.
pub fn angle_between(a: Vec3, b: Vec3) -> VectorResult<f32> {
    Ok(cos_angle_between(a, b)?.clamp(-1.0, 1.0).acos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_from_points_is_head_minus_tail() {
        let tail = Vec3::new(1.0, 1.0, 1.0);
        let head = Vec3::new(4.0, 5.0, 1.0);
        assert_eq!(from_points(tail, head), Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(length(from_points(tail, head)), 5.0);
    }

    #[test]
    fn test_normalize() {
        let n = normalize(Vec3::new(0.0, 3.0, 4.0)).unwrap();
        assert!(approx_eq(n, Vec3::new(0.0, 0.6, 0.8)));
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_fails() {
        let err = normalize(Vec3::ZERO).unwrap_err();
        assert_eq!(err, DegenerateVectorError(Vec3::ZERO));
    }

    #[test]
    fn test_normalize_infinite_fails() {
        assert!(normalize(Vec3::new(f32::INFINITY, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_reflect_about_unit_normal() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        let r = reflect(v, Vec3::Y).unwrap();
        assert!(approx_eq(r, Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_reflect_normalizes_normal() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        let r = reflect(v, Vec3::new(0.0, 10.0, 0.0)).unwrap();
        assert!(approx_eq(r, Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_reflect_is_involution() {
        let normals = [
            Vec3::Y,
            Vec3::new(1.0, 2.0, 3.0).normalize(),
            Vec3::new(-0.3, 0.1, 0.9).normalize(),
        ];
        let vectors = [
            Vec3::new(0.2, -0.7, 0.1),
            Vec3::new(5.0, 1.0, -2.0),
            Vec3::new(-1.0, -1.0, -1.0),
        ];
        for n in normals {
            for v in vectors {
                let twice = reflect(reflect(v, n).unwrap(), n).unwrap();
                assert!(approx_eq(twice, v), "{v:?} about {n:?} gave {twice:?}");
            }
        }
    }

    #[test]
    fn test_reflect_zero_normal_fails() {
        assert!(reflect(Vec3::X, Vec3::ZERO).is_err());
    }

    #[test]
    fn test_angle_between() {
        let angle = angle_between(Vec3::X, Vec3::new(0.0, 2.0, 0.0)).unwrap();
        assert!((angle - FRAC_PI_2).abs() < 1e-6);

        let cos = cos_angle_between(Vec3::X, Vec3::new(3.0, 0.0, 0.0)).unwrap();
        assert!((cos - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_angle_with_zero_vector_fails() {
        assert!(angle_between(Vec3::X, Vec3::ZERO).is_err());
        assert!(cos_angle_between(Vec3::ZERO, Vec3::X).is_err());
    }
}
