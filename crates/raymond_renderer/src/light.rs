//! Point and directional light sources.

use crate::Color;
use raymond_math::Vec3;
use serde::{Deserialize, Serialize};

/// Where light comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightKind {
    /// Omnidirectional light at a position, attenuated with distance
    Point { position: Vec3 },
    /// Light arriving along a fixed direction from infinitely far away
    Directional { direction: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
}

/// Incident light at a shaded point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightInfo {
    /// Unit direction from the shaded point toward the light
    pub direction: Vec3,
    /// Distance to the light, infinite for directional lights
    pub distance: f32,
    /// Intensity after attenuation
    pub intensity: f32,
}

impl Light {
    pub fn point(position: Vec3, color: Color, intensity: f32) -> Self {
        Self {
            kind: LightKind::Point { position },
            color,
            intensity: intensity.max(0.0),
        }
    }

    /// `direction` is the direction the light travels in.
    pub fn directional(direction: Vec3, color: Color, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional {
                direction: direction.normalize(),
            },
            color,
            intensity: intensity.max(0.0),
        }
    }

    /// Direction, distance and attenuated intensity seen from `point`.
    ///
    /// Point lights fall off as `1 / (1 + d^2)`: inverse-square at range,
    /// bounded by the source intensity close to it.
    pub fn illuminate(&self, point: Vec3) -> LightInfo {
        match self.kind {
            LightKind::Point { position } => {
                let to_light = position - point;
                let distance = to_light.length();
                LightInfo {
                    direction: to_light / distance,
                    distance,
                    intensity: self.intensity / (1.0 + distance * distance),
                }
            }
            LightKind::Directional { direction } => LightInfo {
                direction: -direction,
                distance: f32::INFINITY,
                intensity: self.intensity,
            },
        }
    }

    /// Light color scaled by the attenuated intensity.
    pub fn radiance(&self, info: &LightInfo) -> Color {
        self.color * info.intensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_light_info() {
        let light = Light::point(Vec3::new(0.0, 0.0, 3.0), Color::ONE, 10.0);
        let info = light.illuminate(Vec3::ZERO);

        assert_eq!(info.direction, Vec3::Z);
        assert_eq!(info.distance, 3.0);
        assert!((info.intensity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_light_attenuates() {
        let light = Light::point(Vec3::ZERO, Color::ONE, 1.0);
        let near = light.illuminate(Vec3::X).intensity;
        let far = light.illuminate(Vec3::X * 4.0).intensity;
        assert!(far < near);
        assert!(near <= 1.0);
    }

    #[test]
    fn test_directional_light_does_not_attenuate() {
        let light = Light::directional(Vec3::new(0.0, 0.0, -2.0), Color::ONE, 0.7);
        let a = light.illuminate(Vec3::ZERO);
        let b = light.illuminate(Vec3::splat(1000.0));

        assert_eq!(a.direction, Vec3::Z);
        assert!(a.distance.is_infinite());
        assert_eq!(a.intensity, 0.7);
        assert_eq!(a.intensity, b.intensity);
    }

    #[test]
    fn test_negative_intensity_is_clamped() {
        let light = Light::point(Vec3::ZERO, Color::ONE, -1.0);
        assert_eq!(light.intensity, 0.0);
    }
}
