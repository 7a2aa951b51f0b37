//! Recursive trace-then-shade light transport.
//!
//! Per hit: emissive surfaces return their emission; everything else gets
//! Lambert + Phong direct lighting with hard shadows, darkened by ambient
//! occlusion, plus a mirror bounce weighted by the specular coefficient.

use crate::sampling::{cosine_hemisphere, gen_f32, pixel_seed};
use crate::{Bvh, Camera, Color, IntersectInfo, Light, RenderSettings, Scene};
use raymond_math::{reflect, Interval, Ray, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Mutable per-worker state threaded through the recursion.
pub struct TraceContext {
    rng: StdRng,
    /// Number of `trace` calls (camera rays and reflection rays)
    pub rays_traced: u64,
    /// Deepest bounce index reached
    pub deepest_bounce: u32,
}

impl TraceContext {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            rays_traced: 0,
            deepest_bounce: 0,
        }
    }

    /// Restart the random sequence without resetting the counters.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

/// Read-only view of a scene prepared for tracing.
pub struct Tracer<'a> {
    bvh: Bvh<'a>,
    lights: &'a [Light],
    settings: &'a RenderSettings,
}

impl<'a> Tracer<'a> {
    /// Build the BVH for `scene` and bind it to `settings`.
    pub fn new(scene: &'a Scene, settings: &'a RenderSettings) -> Self {
        Self {
            bvh: scene.build_bvh(),
            lights: scene.lights(),
            settings,
        }
    }

    pub fn bvh(&self) -> &Bvh<'a> {
        &self.bvh
    }

    /// Average of `settings.samples` jittered camera rays through (x, y).
    ///
    /// The jitter sequence is seeded from `(seed, pixel index)` only, so a
    /// pixel's value does not depend on which worker renders it.
    pub fn sample_pixel(
        &self,
        camera: &Camera,
        x: u32,
        y: u32,
        seed: u64,
        ctx: &mut TraceContext,
    ) -> Color {
        let index = y as u64 * camera.width() as u64 + x as u64;
        ctx.reseed(pixel_seed(seed, index));

        let mut pixel_color = Color::ZERO;
        for _ in 0..self.settings.samples {
            let jitter_x = gen_f32(&mut ctx.rng);
            let jitter_y = gen_f32(&mut ctx.rng);
            let ray = camera.generate_ray(x, y, jitter_x, jitter_y);
            pixel_color += self.trace(&ray, 0, ctx);
        }

        (pixel_color / self.settings.samples as f32).clamp(Color::ZERO, Color::ONE)
    }

    /// Color seen along `ray`, `bounce` reflections deep.
    pub fn trace(&self, ray: &Ray, bounce: u32, ctx: &mut TraceContext) -> Color {
        ctx.rays_traced += 1;
        ctx.deepest_bounce = ctx.deepest_bounce.max(bounce);

        let Some(info) = self.bvh.intersect(ray, Interval::FORWARD) else {
            return self.settings.background;
        };

        let material = info.material;
        if material.is_emissive() {
            return material.emission_at(info.position);
        }

        let albedo = material.color_at(info.position);
        let direct = self
            .lights
            .iter()
            .map(|light| self.shade(light, ray, &info))
            .fold(Color::ZERO, |acc, c| acc + c);
        let occlusion = self.ambient_occlusion(&info, ctx);
        let mut color = (direct + self.settings.ambient * albedo) * occlusion;

        if bounce < self.settings.max_bounces && material.specular > 0.0 {
            let reflected = Ray::new(self.offset(&info), reflect(ray.direction(), info.normal));
            color += material.specular * self.trace(&reflected, bounce + 1, ctx);
        }

        color
    }

    /// Direct contribution of one light: Lambert diffuse plus Phong highlight,
    /// zero when the light is shadowed.
    pub fn shade(&self, light: &Light, ray: &Ray, info: &IntersectInfo<'_>) -> Color {
        let light_info = light.illuminate(info.position);
        let n_dot_l = info.normal.dot(light_info.direction);
        if !(light_info.intensity > 0.0 && n_dot_l > 0.0) {
            return Color::ZERO;
        }

        let shadow_ray = Ray::new(self.offset(info), light_info.direction);
        if self.bvh.is_occluded(&shadow_ray, light_info.distance) {
            return Color::ZERO;
        }

        let material = info.material;
        let radiance = light.radiance(&light_info);
        let diffuse = n_dot_l * radiance * material.color_at(info.position);

        let reflect_dir = reflect(-light_info.direction, info.normal);
        let view_dir = -ray.direction();
        let highlight = reflect_dir.dot(view_dir).max(0.0).powf(material.specular_power);
        let specular = highlight * material.specular * radiance;

        diffuse + specular
    }

    /// Fraction of cosine-weighted hemisphere rays that escape within
    /// `ao_radius`. Returns 1 when ambient occlusion is disabled.
    fn ambient_occlusion(&self, info: &IntersectInfo<'_>, ctx: &mut TraceContext) -> f32 {
        let samples = self.settings.ao_samples;
        if samples == 0 {
            return 1.0;
        }

        let origin = self.offset(info);
        let unoccluded = (0..samples)
            .filter(|_| {
                let dir = cosine_hemisphere(info.normal, &mut ctx.rng);
                !self.bvh.is_occluded(&Ray::new(origin, dir), self.settings.ao_radius)
            })
            .count();

        unoccluded as f32 / samples as f32
    }

    /// Secondary ray origin nudged off the surface.
    fn offset(&self, info: &IntersectInfo<'_>) -> Vec3 {
        info.position + info.normal * self.settings.shadow_bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scenes, Material, Plane, Sphere};

    fn lit_sphere_scene() -> Scene {
        let mut scene = Scene::default();
        scene
            .add(Sphere::new(Vec3::ZERO, 1.0, Material::new(Color::new(1.0, 0.5, 0.25)).shared()))
            .add_light(Light::directional(-Vec3::Z, Color::ONE, 1.0));
        scene
    }

    #[test]
    fn test_miss_returns_background() {
        let scene = lit_sphere_scene();
        let settings = RenderSettings::default().with_background(Color::new(0.1, 0.2, 0.3));
        let tracer = Tracer::new(&scene, &settings);
        let mut ctx = TraceContext::new(0);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert_eq!(tracer.trace(&ray, 0, &mut ctx), Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_lambert_at_normal_incidence() {
        let scene = lit_sphere_scene();
        let settings = RenderSettings::default().with_ao_samples(0);
        let tracer = Tracer::new(&scene, &settings);
        let mut ctx = TraceContext::new(0);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let color = tracer.trace(&ray, 0, &mut ctx);
        assert!((color - Color::new(1.0, 0.5, 0.25)).length() < 1e-5);
    }

    #[test]
    fn test_phong_highlight_adds_light() {
        let shiny = Material::new(Color::splat(0.5)).with_specular(0.5, 8.0).shared();
        let mut scene = Scene::default();
        scene
            .add(Sphere::new(Vec3::ZERO, 1.0, shiny))
            .add_light(Light::directional(-Vec3::Z, Color::ONE, 1.0));
        let settings = RenderSettings::default().with_ao_samples(0).with_max_bounces(0);
        let tracer = Tracer::new(&scene, &settings);
        let mut ctx = TraceContext::new(0);

        let color = tracer.trace(&Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z), 0, &mut ctx);
        assert!((color - Color::splat(1.0)).length() < 1e-5);
    }

    #[test]
    fn test_shadowed_point_gets_no_direct_light() {
        let mut scene = Scene::default();
        let white = Material::default().shared();
        scene
            .add(Plane::ground(white.clone()))
            .add(Sphere::new(Vec3::new(0.0, 0.0, 2.0), 0.5, white))
            .add_light(Light::point(Vec3::new(0.0, 0.0, 5.0), Color::ONE, 10.0));
        let settings = RenderSettings::default().with_ao_samples(0);
        let tracer = Tracer::new(&scene, &settings);
        let mut ctx = TraceContext::new(0);

        // Straight below the sphere: in shadow.
        let below = Ray::new(Vec3::new(0.2, -3.0, 3.0), Vec3::new(-0.2, 3.0, -3.0));
        let shadowed = tracer.trace(&below, 0, &mut ctx);
        assert_eq!(shadowed, Color::ZERO);

        // Far to the side: lit.
        let lit = tracer.trace(&Ray::new(Vec3::new(3.0, 0.0, 3.0), -Vec3::Z), 0, &mut ctx);
        assert!(lit.x > 0.0);
    }

    #[test]
    fn test_emissive_short_circuits() {
        let mut scene = Scene::default();
        let glow = Material::new(Color::new(1.0, 0.8, 0.6)).with_emissive(2.0).shared();
        scene.add(Sphere::new(Vec3::ZERO, 1.0, glow));
        let settings = RenderSettings::default();
        let tracer = Tracer::new(&scene, &settings);
        let mut ctx = TraceContext::new(0);

        let color = tracer.trace(&Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z), 0, &mut ctx);
        assert_eq!(color, Color::new(2.0, 1.6, 1.2));
        assert_eq!(ctx.rays_traced, 1);
    }

    #[test]
    fn test_ambient_occlusion_darkens_corners() {
        let mut scene = Scene::default();
        let white = Material::default().shared();
        scene
            .add(Plane::ground(white.clone()))
            .add(Plane::new(Vec3::X, 0.0, white));
        let settings = RenderSettings::default()
            .with_ambient(Color::ONE)
            .with_ao_samples(64)
            .with_ao_radius(1.0);
        let tracer = Tracer::new(&scene, &settings);
        let mut ctx = TraceContext::new(3);

        let open = tracer.trace(&Ray::new(Vec3::new(5.0, 0.0, 1.0), -Vec3::Z), 0, &mut ctx);
        let corner = tracer.trace(&Ray::new(Vec3::new(0.05, 0.0, 1.0), -Vec3::Z), 0, &mut ctx);
        assert_eq!(open, Color::ONE);
        assert!(corner.x < 0.9, "corner {corner}");
    }

    #[test]
    fn test_mirror_recursion_is_bounded() {
        let scene = scenes::mirror_box(8, 8);
        for max_bounces in [0, 1, 3, 7] {
            let settings = RenderSettings::default()
                .with_max_bounces(max_bounces)
                .with_ao_samples(0);
            let tracer = Tracer::new(&scene, &settings);
            let mut ctx = TraceContext::new(0);

            let ray = Ray::new(Vec3::new(0.1, 0.2, 0.3), Vec3::new(1.0, 0.7, 0.3));
            let color = tracer.trace(&ray, 0, &mut ctx);
            assert!(color.is_finite());
            assert_eq!(ctx.deepest_bounce, max_bounces);
            assert_eq!(ctx.rays_traced, max_bounces as u64 + 1);
        }
    }

    #[test]
    fn test_sample_pixel_is_deterministic() {
        let scene = scenes::cornell_box(16, 16);
        let settings = RenderSettings::default().with_samples(4);
        let tracer = Tracer::new(&scene, &settings);

        let a = tracer.sample_pixel(scene.camera(), 8, 9, 99, &mut TraceContext::new(0));
        let b = tracer.sample_pixel(scene.camera(), 8, 9, 99, &mut TraceContext::new(12345));
        assert_eq!(a, b);
        assert!(a.cmpge(Color::ZERO).all() && a.cmple(Color::ONE).all());
    }
}
