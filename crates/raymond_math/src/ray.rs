use crate::Vec3;

/// A ray in 3D space.
///
/// Rays built with [`Ray::new`] carry a unit direction; the reciprocal of the
/// direction is cached for slab tests. Zero components produce infinities in
/// that reciprocal, which the slab arithmetic relies on.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    inv_direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing `direction`.
    ///
    /// A zero-length direction yields a NaN direction; such a ray hits nothing.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self::from_raw(origin, direction.normalize())
    }

    /// Create a ray keeping `direction` exactly as given.
    ///
    /// Used for object-space rays, where the world-space hit parameter must be
    /// preserved through the inverse transform.
    pub fn from_raw(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
        }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Component-wise `1 / direction`.
    #[inline]
    pub fn inv_direction(&self) -> Vec3 {
        self.inv_direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
