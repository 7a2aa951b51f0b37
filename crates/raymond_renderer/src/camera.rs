//! Pinhole camera for primary ray generation.

use crate::Ray;
use raymond_math::Vec3;

/// Camera mapping sensor pixels to world-space rays.
///
/// The orthonormal basis and image-plane vectors are recomputed by every
/// builder method, so a camera is always ready to generate rays.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    image_width: u32,
    image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    vfov: f32,           // Vertical field of view in degrees
    aspect: Option<f32>, // Width / height override; None follows the resolution

    // Cached computed values
    upper_left: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        let mut camera = Self {
            image_width: 300,
            image_height: 300,
            look_from: Vec3::new(0.0, 0.0, 0.0),
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::new(0.0, 1.0, 0.0),
            vfov: 60.0,
            aspect: None,
            upper_left: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
        };
        camera.update();
        camera
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self.update();
        self
    }

    /// Set eye position, look-at target and up vector.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self.update();
        self
    }

    /// Set the vertical field of view in degrees.
    pub fn with_fov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self.update();
        self
    }

    /// Override the aspect ratio (width / height) of the image plane.
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = Some(aspect);
        self.update();
        self
    }

    pub fn width(&self) -> u32 {
        self.image_width
    }

    pub fn height(&self) -> u32 {
        self.image_height
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        -self.w
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
            .unwrap_or(self.image_width as f32 / self.image_height.max(1) as f32)
    }

    fn update(&mut self) {
        let theta = self.vfov.to_radians();
        let viewport_height = 2.0 * (theta / 2.0).tan();
        let viewport_width = viewport_height * self.aspect();

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Image plane at unit distance, v pointing down the rows
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;

        self.pixel_delta_u = viewport_u / self.image_width.max(1) as f32;
        self.pixel_delta_v = viewport_v / self.image_height.max(1) as f32;
        self.upper_left = self.look_from - self.w - viewport_u / 2.0 - viewport_v / 2.0;
    }

    /// Ray from the eye through pixel (x, y) offset by a jitter in `[0, 1)`.
    ///
    /// A jitter of (0.5, 0.5) passes through the pixel center.
    pub fn generate_ray(&self, x: u32, y: u32, jitter_x: f32, jitter_y: f32) -> Ray {
        let pixel_sample = self.upper_left
            + (x as f32 + jitter_x) * self.pixel_delta_u
            + (y as f32 + jitter_y) * self.pixel_delta_v;

        Ray::new(self.look_from, pixel_sample - self.look_from)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
