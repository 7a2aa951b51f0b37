//! Surface description used by the shading model.

use raymond_math::Vec3;
use std::fmt::Debug;
use std::sync::Arc;

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Procedural color as a function of world position.
pub trait SolidTexture: Send + Sync + Debug {
    fn color_at(&self, position: Vec3) -> Color;
}

/// Surface reflectance of a primitive.
///
/// Coefficients are independent weights; they do not need to sum to one.
/// Primitives hold materials through `Arc`, so one material can be shared by
/// any number of shapes.
#[derive(Debug, Clone)]
pub struct Material {
    /// Base (diffuse) color
    pub color: Color,
    /// Weight of the Phong highlight and of mirror reflection
    pub specular: f32,
    /// Phong exponent
    pub specular_power: f32,
    /// Emission scale; anything above zero makes the surface a light
    pub emissive: f32,
    /// Optional procedural texture, modulating `color`
    pub texture: Option<Arc<dyn SolidTexture>>,
}

impl Material {
    /// Create a plain diffuse material.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Set the specular weight and Phong exponent.
    pub fn with_specular(mut self, specular: f32, specular_power: f32) -> Self {
        self.specular = specular.max(0.0);
        self.specular_power = specular_power;
        self
    }

    /// Set the emission scale (negative values are clamped to zero).
    pub fn with_emissive(mut self, emissive: f32) -> Self {
        self.emissive = emissive.max(0.0);
        self
    }

    /// Attach a procedural texture.
    pub fn with_texture(mut self, texture: impl SolidTexture + 'static) -> Self {
        self.texture = Some(Arc::new(texture));
        self
    }

    /// Wrap in an `Arc` for sharing between primitives.
    pub fn shared(self) -> Arc<Material> {
        Arc::new(self)
    }

    pub fn is_emissive(&self) -> bool {
        self.emissive > 0.0
    }

    /// Emissive surfaces are light geometry and do not block shadow rays.
    pub fn casts_shadow(&self) -> bool {
        !self.is_emissive()
    }

    /// Albedo at a world-space position.
    pub fn color_at(&self, position: Vec3) -> Color {
        match &self.texture {
            Some(texture) => self.color * texture.color_at(position),
            None => self.color,
        }
    }

    /// Radiance of an emissive surface.
    pub fn emission_at(&self, position: Vec3) -> Color {
        self.color_at(position) * self.emissive
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::ONE,
            specular: 0.0,
            specular_power: 16.0,
            emissive: 0.0,
            texture: None,
        }
    }
}

/// Checkerboard on the XY plane, alternating every `scale` units.
#[derive(Debug, Clone, Copy)]
pub struct Checkerboard {
    pub scale: f32,
    pub even: Color,
    pub odd: Color,
}

impl Checkerboard {
    pub fn new(scale: f32, even: Color, odd: Color) -> Self {
        Self { scale, even, odd }
    }
}

impl Default for Checkerboard {
    fn default() -> Self {
        Self::new(1.0, Color::ONE, Color::ZERO)
    }
}

impl SolidTexture for Checkerboard {
    fn color_at(&self, position: Vec3) -> Color {
        let cell = (position / self.scale).floor();
        if (cell.x as i64 + cell.y as i64).rem_euclid(2) == 0 {
            self.even
        } else {
            self.odd
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material_is_white_diffuse() {
        let m = Material::default();
        assert_eq!(m.color, Color::ONE);
        assert_eq!(m.specular, 0.0);
        assert!(!m.is_emissive());
        assert!(m.casts_shadow());
    }

    #[test]
    fn test_emissive_is_clamped() {
        let m = Material::new(Color::ONE).with_emissive(-2.0);
        assert_eq!(m.emissive, 0.0);
        assert!(!m.is_emissive());
    }

    #[test]
    fn test_emission_scales_color() {
        let m = Material::new(Color::new(1.0, 0.5, 0.0)).with_emissive(2.0);
        assert_eq!(m.emission_at(Vec3::ZERO), Color::new(2.0, 1.0, 0.0));
        assert!(!m.casts_shadow());
    }

    #[test]
    fn test_checkerboard_alternates_across_origin() {
        let checker = Checkerboard::default();
        let a = checker.color_at(Vec3::new(0.5, 0.5, 0.0));
        let b = checker.color_at(Vec3::new(-0.5, 0.5, 0.0));
        let c = checker.color_at(Vec3::new(-0.5, -0.5, 0.0));
        assert_eq!(a, Color::ONE);
        assert_eq!(b, Color::ZERO);
        assert_eq!(c, Color::ONE);
    }

    #[test]
    fn test_texture_modulates_color() {
        let m = Material::new(Color::new(0.5, 0.5, 0.5)).with_texture(Checkerboard::default());
        assert_eq!(m.color_at(Vec3::new(0.5, 0.5, 0.0)), Color::splat(0.5));
        assert_eq!(m.color_at(Vec3::new(1.5, 0.5, 0.0)), Color::ZERO);
    }
}
