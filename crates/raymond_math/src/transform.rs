// Affine object-to-world transforms for traceable shapes.
//
// Shapes intersect in their own object space; a Transform carries the matrix,
// its inverse and the normal matrix so that each query pays only for the
// multiplications it needs.

use glam::{Mat3, Mat4, Vec3};
use crate::{Aabb, Ray};

/// Extension trait for Mat4 with ray tracing helpers.
pub trait Mat4Ext {
    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let (lo, hi) = (aabb.min(), aabb.max());

        let mut result_min = Vec3::splat(f32::INFINITY);
        let mut result_max = Vec3::splat(f32::NEG_INFINITY);

        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            let p = self.transform_point3(corner);
            result_min = result_min.min(p);
            result_max = result_max.max(p);
        }

        Aabb::from_points(result_min, result_max)
    }
}

/// Object-to-world affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Mat4,
    inverse: Mat4,
    normal_matrix: Mat3,
    identity: bool,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        matrix: Mat4::IDENTITY,
        inverse: Mat4::IDENTITY,
        normal_matrix: Mat3::IDENTITY,
        identity: true,
    };

    /// Build a transform from an object-to-world matrix.
    ///
    /// A singular matrix produces a non-finite inverse; rays mapped through it
    /// carry NaNs and never hit.
    pub fn new(matrix: Mat4) -> Self {
        let inverse = matrix.inverse();
        Self {
            matrix,
            inverse,
            normal_matrix: Mat3::from_mat4(inverse).transpose(),
            identity: matrix == Mat4::IDENTITY,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Map a world-space ray into object space.
    ///
    /// The direction is not renormalized, so a hit at parameter `t` in object
    /// space is the hit at the same `t` on the world ray.
    pub fn ray_to_local(&self, ray: &Ray) -> Ray {
        if self.identity {
            return *ray;
        }
        Ray::from_raw(
            self.inverse.transform_point3(ray.origin()),
            self.inverse.transform_vector3(ray.direction()),
        )
    }

    /// Map an object-space point to world space.
    pub fn point_to_world(&self, p: Vec3) -> Vec3 {
        if self.identity {
            return p;
        }
        self.matrix.transform_point3(p)
    }

    /// Map an object-space normal to a unit world-space normal.
    pub fn normal_to_world(&self, n: Vec3) -> Vec3 {
        if self.identity {
            return n;
        }
        (self.normal_matrix * n).normalize()
    }

    /// World-space box around an object-space box.
    pub fn aabb_to_world(&self, aabb: &Aabb) -> Aabb {
        if self.identity || !aabb.is_finite() {
            return *aabb;
        }
        self.matrix.transform_aabb(aabb)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Mat4> for Transform {
    fn from(matrix: Mat4) -> Self {
        Self::new(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_transform_aabb_translation() {
        let mat = Mat4::from_translation(Vec3::splat(5.0));
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let transformed = mat.transform_aabb(&aabb);

        assert!((transformed.min() - Vec3::splat(5.0)).length() < 0.001);
        assert!((transformed.max() - Vec3::splat(6.0)).length() < 0.001);
    }

    #[test]
    fn test_transform_aabb_rotation_grows_box() {
        let mat = Mat4::from_rotation_z(PI / 4.0);
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let transformed = mat.transform_aabb(&aabb);

        let half_diag = 2.0_f32.sqrt();
        assert!((transformed.x.max - half_diag).abs() < 0.001);
        assert!((transformed.z.max - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_ray_to_local_preserves_parameter() {
        let transform = Transform::new(
            Mat4::from_translation(Vec3::new(0.0, 0.0, 3.0)) * Mat4::from_scale(Vec3::splat(2.0)),
        );
        let world = Ray::new(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z);
        let local = transform.ray_to_local(&world);

        let t = 4.0;
        let back = transform.point_to_world(local.at(t));
        assert!((back - world.at(t)).length() < 1e-5);
    }

    #[test]
    fn test_normal_to_world_nonuniform_scale() {
        // Squashing y keeps a 45 degree normal perpendicular to the surface.
        let transform = Transform::new(Mat4::from_scale(Vec3::new(1.0, 0.5, 1.0)));
        let n = transform.normal_to_world(Vec3::new(1.0, 1.0, 0.0).normalize());
        let tangent = transform.matrix().transform_vector3(Vec3::new(1.0, -1.0, 0.0));

        assert!(n.dot(tangent).abs() < 1e-5);
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_identity_is_passthrough() {
        let t = Transform::default();
        assert!(t.is_identity());
        let ray = Ray::new(Vec3::ONE, Vec3::X);
        assert_eq!(t.ray_to_local(&ray), ray);
        assert_eq!(t.normal_to_world(Vec3::Y), Vec3::Y);
    }

    #[test]
    fn test_singular_matrix_yields_nan_rays() {
        let t = Transform::new(Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)));
        let local = t.ray_to_local(&Ray::new(Vec3::ONE, Vec3::X));
        assert!(
            local.origin().is_nan() || local.direction().is_nan() || !local.origin().is_finite()
        );
    }
}
