//! Axis-aligned box primitive (in object space).

use crate::traceable::{IntersectInfo, LocalHit, Traceable};
use crate::Material;
use raymond_math::{Aabb, Interval, Mat4, Ray, Transform, Vec3};
use std::sync::Arc;

/// A box given by its center and half-extents, optionally transformed.
pub struct Cuboid {
    center: Vec3,
    extent: Vec3,
    transform: Transform,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Cuboid {
    pub fn new(center: Vec3, extent: Vec3, material: Arc<Material>) -> Self {
        let mut cuboid = Self {
            center,
            extent: extent.abs(),
            transform: Transform::IDENTITY,
            material,
            bbox: Aabb::EMPTY,
        };
        cuboid.update_bbox();
        cuboid
    }

    /// Place the box with an object-to-world matrix.
    pub fn with_transform(mut self, matrix: Mat4) -> Self {
        self.transform = Transform::new(matrix);
        self.update_bbox();
        self
    }

    fn update_bbox(&mut self) {
        let local = Aabb::from_points(self.center - self.extent, self.center + self.extent);
        self.bbox = self.transform.aabb_to_world(&local);
    }

    /// Slab interval `(near, far)` of the ray against the box.
    ///
    /// No zero-direction guard: the cached reciprocal is infinite and the
    /// min/max selection stays consistent under IEEE arithmetic.
    fn slabs(&self, ray: &Ray) -> (f32, f32) {
        let boxmin = self.center - self.extent;
        let boxmax = self.center + self.extent;

        let t0 = (boxmin - ray.origin()) * ray.inv_direction();
        let t1 = (boxmax - ray.origin()) * ray.inv_direction();
        let near = t0.min(t1).max_element();
        let far = t0.max(t1).min_element();
        (near, far)
    }

    /// Entry parameter, if the box is hit in front of the origin within `ray_t`.
    fn entry(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let (near, far) = self.slabs(ray);
        (far >= near && ray_t.surrounds(near)).then_some(near)
    }

    /// Outward normal of the face containing `position`.
    fn face_normal(&self, position: Vec3) -> Vec3 {
        // Relative position scaled to a unit box; the dominant axis is the face.
        let rel = (position - self.center) / (self.extent * 2.0);
        let a = rel.abs();

        let axis = if a.x > a.y {
            if a.x > a.z { Vec3::X } else { Vec3::Z }
        } else if a.y > a.z {
            Vec3::Y
        } else {
            Vec3::Z
        };

        if axis.dot(rel) < 0.0 { -axis } else { axis }
    }
}

impl Traceable for Cuboid {
    fn trace(&self, ray: &Ray, ray_t: Interval) -> Option<IntersectInfo<'_>> {
        let local = self.transform.ray_to_local(ray);
        let t = self.entry(&local, ray_t)?;
        let normal = self.face_normal(local.at(t));
        Some(LocalHit { t, normal }.into_world(ray, &self.transform, &self.material))
    }

    fn test(&self, ray: &Ray, ray_t: Interval) -> bool {
        let local = self.transform.ray_to_local(ray);
        self.entry(&local, ray_t).is_some()
    }

    fn aabb(&self) -> Aabb {
        self.bbox
    }

    fn material(&self) -> &Material {
        &self.material
    }
}
