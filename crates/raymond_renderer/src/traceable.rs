//! Traceable trait and IntersectInfo for ray-primitive intersection.

use crate::Material;
use raymond_math::{Aabb, Interval, Ray, Transform, Vec3};

/// Record of a ray-primitive intersection.
#[derive(Debug, Clone, Copy)]
pub struct IntersectInfo<'a> {
    /// World-space point of intersection
    pub position: Vec3,
    /// Unit surface normal, facing the incoming ray
    pub normal: Vec3,
    /// Ray parameter of the hit, always inside the queried interval
    pub distance: f32,
    /// Material of the hit primitive
    pub material: &'a Material,
}

/// Capability shared by every scene primitive.
///
/// `trace` and `test` only report hits whose parameter lies strictly inside
/// `ray_t`; a ray starting inside a closed shape reports no hit.
pub trait Traceable: Send + Sync {
    /// Nearest intersection with a position and a unit normal.
    fn trace(&self, ray: &Ray, ray_t: Interval) -> Option<IntersectInfo<'_>>;

    /// Existence-only test used for shadow and occlusion rays.
    fn test(&self, ray: &Ray, ray_t: Interval) -> bool;

    /// World-space bounding box. Unbounded shapes return a non-finite box.
    fn aabb(&self) -> Aabb;

    /// Surface material.
    fn material(&self) -> &Material;
}

/// Object-space hit produced by a shape before it is mapped to world space.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LocalHit {
    pub t: f32,
    pub normal: Vec3,
}

impl LocalHit {
    pub(crate) fn into_world<'a>(
        self,
        ray: &Ray,
        transform: &Transform,
        material: &'a Material,
    ) -> IntersectInfo<'a> {
        IntersectInfo {
            position: ray.at(self.t),
            normal: transform.normal_to_world(self.normal),
            distance: self.t,
            material,
        }
    }
}
