//! Scene container: primitives, lights and the camera.

use crate::{Bvh, Camera, IntersectInfo, Light, Traceable};
use raymond_math::{Interval, Ray};

/// Everything a render needs as input.
///
/// Insertion order only matters for exact ties between primitives, where the
/// linear queries report the earliest inserted one.
#[derive(Default)]
pub struct Scene {
    objects: Vec<Box<dyn Traceable>>,
    lights: Vec<Light>,
    camera: Camera,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            camera,
        }
    }

    /// Add a primitive.
    pub fn add(&mut self, object: impl Traceable + 'static) -> &mut Self {
        self.objects.push(Box::new(object));
        self
    }

    pub fn add_light(&mut self, light: Light) -> &mut Self {
        self.lights.push(light);
        self
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn objects(&self) -> impl Iterator<Item = &dyn Traceable> + '_ {
        self.objects.iter().map(|o| o.as_ref())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Build the accelerated query object over the current primitives.
    ///
    /// Its [`Bvh::intersect`] and [`Bvh::is_occluded`] answer the same
    /// queries as the methods below in sub-linear time; rendering always
    /// goes through them.
    pub fn build_bvh(&self) -> Bvh<'_> {
        Bvh::build(self.objects())
    }

    /// Nearest forward hit, brute force over every primitive.
    ///
    /// Linear time. Kept as the reference the BVH is checked against; use
    /// [`Scene::build_bvh`] for repeated queries.
    pub fn intersect(&self, ray: &Ray) -> Option<IntersectInfo<'_>> {
        let mut closest = None;
        let mut range = Interval::FORWARD;
        for object in self.objects() {
            if let Some(hit) = object.trace(ray, range) {
                range = range.with_max(hit.distance);
                closest = Some(hit);
            }
        }
        closest
    }

    /// Whether a shadow-casting primitive blocks `ray` within
    /// `max_distance`, brute force over every primitive. Linear time, like
    /// [`Scene::intersect`].
    pub fn is_occluded(&self, ray: &Ray, max_distance: f32) -> bool {
        let range = Interval::forward(max_distance);
        self.objects()
            .any(|o| o.material().casts_shadow() && o.test(ray, range))
    }
}
