//! Raymond math - value types shared by the ray tracer.
//!
//! Re-exports `glam` and adds the tracing-specific types on top of it:
//! parametric [`Interval`]s, [`Ray`]s, axis-aligned bounding boxes and
//! affine object-to-world [`Transform`]s.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::{Mat4Ext, Transform};

/// Reflect `v` about the unit normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_off_floor() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        let r = reflect(v, Vec3::Y);
        assert_eq!(r, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_reflect_head_on() {
        let r = reflect(-Vec3::Z, Vec3::Z);
        assert_eq!(r, Vec3::Z);
    }
}
