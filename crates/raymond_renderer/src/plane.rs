//! Infinite plane primitive.

use crate::traceable::{IntersectInfo, LocalHit, Traceable};
use crate::Material;
use raymond_math::{Aabb, Interval, Mat4, Ray, Transform, Vec3};
use std::sync::Arc;

/// The plane `dot(normal, p) == offset`, visible from both sides.
///
/// Unbounded: its bounding box is [`Aabb::UNIVERSE`], so the BVH keeps it out
/// of the tree and tests it on every query.
pub struct Plane {
    normal: Vec3,
    offset: f32,
    transform: Transform,
    material: Arc<Material>,
}

impl Plane {
    pub fn new(normal: Vec3, offset: f32, material: Arc<Material>) -> Self {
        Self {
            normal: normal.normalize(),
            offset,
            transform: Transform::IDENTITY,
            material,
        }
    }

    /// The `z = 0` ground plane.
    pub fn ground(material: Arc<Material>) -> Self {
        Self::new(Vec3::Z, 0.0, material)
    }

    /// Place the plane with an object-to-world matrix.
    pub fn with_transform(mut self, matrix: Mat4) -> Self {
        self.transform = Transform::new(matrix);
        self
    }

    /// Ray parameter of the crossing. Parallel rays divide by zero and the
    /// resulting infinity or NaN fails the interval test.
    fn crossing(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let denom = self.normal.dot(ray.direction());
        let t = (self.offset - self.normal.dot(ray.origin())) / denom;
        ray_t.surrounds(t).then_some(t)
    }
}

impl Traceable for Plane {
    fn trace(&self, ray: &Ray, ray_t: Interval) -> Option<IntersectInfo<'_>> {
        let local = self.transform.ray_to_local(ray);
        let t = self.crossing(&local, ray_t)?;
        // Face the normal toward the ray origin.
        let normal = if self.normal.dot(local.direction()) > 0.0 {
            -self.normal
        } else {
            self.normal
        };
        Some(LocalHit { t, normal }.into_world(ray, &self.transform, &self.material))
    }

    fn test(&self, ray: &Ray, ray_t: Interval) -> bool {
        let local = self.transform.ray_to_local(ray);
        self.crossing(&local, ray_t).is_some()
    }

    fn aabb(&self) -> Aabb {
        Aabb::UNIVERSE
    }

    fn material(&self) -> &Material {
        &self.material
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground() -> Plane {
        Plane::ground(Material::default().shared())
    }

    #[test]
    fn test_plane_hit_from_above() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, 3.0), -Vec3::Z);
        let plane = ground();
        let hit = plane.trace(&ray, Interval::FORWARD).expect("ray should hit");
        assert_eq!(hit.distance, 3.0);
        assert_eq!(hit.normal, Vec3::Z);
        assert_eq!(hit.position, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_plane_normal_faces_ray_from_below() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);
        let plane = ground();
        let hit = plane.trace(&ray, Interval::FORWARD).expect("ray should hit");
        assert_eq!(hit.normal, -Vec3::Z);
    }

    #[test]
    fn test_plane_parallel_and_receding_rays_miss() {
        let parallel = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::X);
        assert!(!ground().test(&parallel, Interval::FORWARD));

        let in_plane = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(!ground().test(&in_plane, Interval::FORWARD));

        let receding = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::Z);
        assert!(!ground().test(&receding, Interval::FORWARD));
    }

    #[test]
    fn test_plane_offset_and_transform() {
        let plane = Plane::new(Vec3::Y, 2.0, Material::default().shared())
            .with_transform(Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)));
        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), -Vec3::Y);
        let hit = plane.trace(&ray, Interval::FORWARD).expect("ray should hit");
        assert!((hit.position.y - 3.0).abs() < 1e-5);
        assert!((hit.normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_plane_is_unbounded() {
        assert!(!ground().aabb().is_finite());
    }
}
