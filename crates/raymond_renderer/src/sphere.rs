//! Sphere primitive.

use crate::traceable::{IntersectInfo, LocalHit, Traceable};
use crate::Material;
use raymond_math::{Aabb, Interval, Mat4, Ray, Transform, Vec3};
use std::sync::Arc;

/// A sphere, optionally placed by an object-to-world transform.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    transform: Transform,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        let radius = radius.max(0.0);
        let mut sphere = Self {
            center,
            radius,
            transform: Transform::IDENTITY,
            material,
            bbox: Aabb::EMPTY,
        };
        sphere.update_bbox();
        sphere
    }

    /// Place the sphere with an object-to-world matrix.
    pub fn with_transform(mut self, matrix: Mat4) -> Self {
        self.transform = Transform::new(matrix);
        self.update_bbox();
        self
    }

    fn update_bbox(&mut self) {
        let rvec = Vec3::splat(self.radius);
        let local = Aabb::from_points(self.center - rvec, self.center + rvec);
        self.bbox = self.transform.aabb_to_world(&local);
    }

    /// Parameter of the near root, if it lies inside `ray_t`.
    ///
    /// Only the near root is considered, so rays starting inside the sphere
    /// miss. The positive-form comparison rejects NaN discriminants.
    fn nearest_root(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if !(discriminant >= 0.0) {
            return None;
        }

        let root = (h - discriminant.sqrt()) / a;
        ray_t.surrounds(root).then_some(root)
    }
}

impl Traceable for Sphere {
    fn trace(&self, ray: &Ray, ray_t: Interval) -> Option<IntersectInfo<'_>> {
        let local = self.transform.ray_to_local(ray);
        let t = self.nearest_root(&local, ray_t)?;
        let normal = (local.at(t) - self.center) / self.radius;
        Some(LocalHit { t, normal }.into_world(ray, &self.transform, &self.material))
    }

    fn test(&self, ray: &Ray, ray_t: Interval) -> bool {
        let local = self.transform.ray_to_local(ray);
        self.nearest_root(&local, ray_t).is_some()
    }

    fn aabb(&self) -> Aabb {
        self.bbox
    }

    fn material(&self) -> &Material {
        &self.material
    }
}
