//! Built-in demo scenes. All of them are Z-up.

use crate::{Camera, Checkerboard, Color, Cuboid, Light, Material, Plane, Scene, Sphere};
use raymond_math::{Mat4, Vec3};
use std::f32::consts::FRAC_PI_2;

/// Names accepted by [`by_name`].
pub const NAMES: &[&str] = &["cornell_box", "mirror_box", "checker"];

/// Look up a demo scene by name.
pub fn by_name(name: &str, width: u32, height: u32) -> Option<Scene> {
    match name {
        "cornell_box" => Some(cornell_box(width, height)),
        "mirror_box" => Some(mirror_box(width, height)),
        "checker" => Some(checker(width, height)),
        _ => None,
    }
}

/// Cornell box built from five slabs, a blue sphere, a rotated block and a
/// small emissive sphere marking the point light.
pub fn cornell_box(width: u32, height: u32) -> Scene {
    let radius = 2.8;
    let theta = FRAC_PI_2;
    let camera = Camera::new()
        .with_resolution(width, height)
        .with_position(
            Vec3::new(radius * theta.cos(), radius * theta.sin(), 1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::Z,
        )
        .with_fov(60.0);

    let white = Material::default().shared();
    let red = Material::new(Color::new(1.0, 0.0, 0.0)).shared();
    let green = Material::new(Color::new(0.0, 1.0, 0.0)).shared();
    let blue = Material::new(Color::new(0.0, 0.0, 1.0)).with_specular(0.2, 16.0).shared();
    let light_material = Material::new(Color::ONE).with_emissive(1.0).shared();

    let slab = |position: Vec3, extent: Vec3, material| {
        Cuboid::new(Vec3::ZERO, extent, material).with_transform(Mat4::from_translation(position))
    };

    let light_position = Vec3::new(0.0, 0.0, 1.8);
    let block = Cuboid::new(Vec3::ZERO, Vec3::new(0.25, 0.25, 0.6), white.clone()).with_transform(
        Mat4::from_rotation_z(0.35) * Mat4::from_translation(Vec3::new(0.25, -0.3, 0.6)),
    );

    let mut scene = Scene::new(camera);
    scene
        .add(Sphere::new(Vec3::new(-0.5, 0.2, 0.25), 0.25, blue))
        .add(slab(Vec3::new(0.0, 0.0, -0.2), Vec3::new(1.0, 1.0, 0.2), white.clone()))
        .add(slab(Vec3::new(0.0, 0.0, 2.2), Vec3::new(1.0, 1.0, 0.2), white.clone()))
        .add(slab(Vec3::new(0.0, -1.2, 1.0), Vec3::new(1.0, 0.2, 1.0), white))
        .add(slab(Vec3::new(1.2, 0.0, 1.0), Vec3::new(0.2, 1.0, 1.0), red))
        .add(slab(Vec3::new(-1.2, 0.0, 1.0), Vec3::new(0.2, 1.0, 1.0), green))
        .add(block)
        .add(Sphere::new(light_position, 0.05, light_material))
        .add_light(Light::point(light_position, Color::ONE, 2.0));
    scene
}

/// Closed box of perfect mirrors around the origin with a mirrored sphere.
///
/// Every reflected ray hits another mirror, so recursion always runs to the
/// bounce limit.
pub fn mirror_box(width: u32, height: u32) -> Scene {
    let half = 2.0;
    let camera = Camera::new()
        .with_resolution(width, height)
        .with_position(Vec3::new(0.0, -1.9, 0.0), Vec3::ZERO, Vec3::Z)
        .with_fov(70.0);

    let mirror = Material::new(Color::splat(0.8)).with_specular(1.0, 64.0).shared();

    let mut scene = Scene::new(camera);
    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        scene
            .add(Plane::new(axis, half, mirror.clone()))
            .add(Plane::new(axis, -half, mirror.clone()));
    }
    scene
        .add(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, mirror))
        .add_light(Light::point(Vec3::new(0.0, 0.0, 1.5), Color::ONE, 1.0));
    scene
}

/// Checkerboard ground with two spheres, a tilted block and three point
/// lights (key and two fills).
pub fn checker(width: u32, height: u32) -> Scene {
    let camera = Camera::new()
        .with_resolution(width, height)
        .with_position(Vec3::new(6.0, 6.0, 4.0), Vec3::new(0.5, 0.0, 0.8), Vec3::Z)
        .with_fov(45.0);

    let checker = Material::default().with_texture(Checkerboard::default()).shared();
    let red = Material::new(Color::new(1.0, 0.0, 0.0)).with_specular(0.7, 32.0).shared();
    let green = Material::new(Color::new(0.0, 1.0, 0.0)).shared();
    let blue = Material::new(Color::new(0.0, 0.0, 1.0)).shared();

    let tilt = Mat4::from_rotation_x(45f32.to_radians());
    let block = Cuboid::new(Vec3::ZERO, Vec3::new(0.3, 0.3, 1.25), blue)
        .with_transform(tilt * Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)));

    let mut scene = Scene::new(camera);
    scene
        .add(Plane::ground(checker))
        .add(Sphere::new(Vec3::new(0.0, 0.0, 1.0), 1.0, red))
        .add(Sphere::new(Vec3::new(1.5, 0.0, 0.5), 0.5, green))
        .add(block)
        .add_light(Light::point(Vec3::new(5.0, 10.0, 10.0), Color::ONE, 90.0))
        .add_light(Light::point(Vec3::new(-10.0, 10.0, 15.0), Color::ONE, 40.0))
        .add_light(Light::point(Vec3::new(10.0, -10.0, 15.0), Color::ONE, 60.0));
    scene
}
