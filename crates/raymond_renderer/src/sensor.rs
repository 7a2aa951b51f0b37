//! Output pixel buffer.
//!
//! Pixels are packed RGBA8 words (memory order R, G, B, A) held in atomics,
//! so a display can read the buffer while workers are still writing it and
//! never observe a half-written pixel. Unwritten pixels are all-zero, i.e.
//! fully transparent; every written pixel is opaque.

use crate::Color;
use image::RgbaImage;
use std::sync::atomic::{AtomicU32, Ordering};

/// Clamp each channel to `[0, 1]` and pack as opaque RGBA8.
pub fn pack_color(color: Color) -> u32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    u32::from_le_bytes([channel(color.x), channel(color.y), channel(color.z), 255])
}

/// Unpack the RGB channels of a packed pixel.
pub fn unpack_color(pixel: u32) -> Color {
    let [r, g, b, _] = pixel.to_le_bytes();
    Color::new(r as f32, g as f32, b as f32) / 255.0
}

pub struct Sensor {
    width: u32,
    height: u32,
    pixels: Vec<AtomicU32>,
}

impl Sensor {
    /// Create a sensor with every pixel unwritten.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: (0..len).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    /// Store a clamped color at (x, y).
    pub fn set_pixel(&self, x: u32, y: u32, color: Color) {
        self.pixels[self.index(x, y)].store(pack_color(color), Ordering::Relaxed);
    }

    /// Packed RGBA8 value at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[self.index(x, y)].load(Ordering::Relaxed)
    }

    /// Decoded color at (x, y).
    pub fn color(&self, x: u32, y: u32) -> Color {
        unpack_color(self.pixel(x, y))
    }

    /// True once (x, y) has been written.
    pub fn is_written(&self, x: u32, y: u32) -> bool {
        self.pixel(x, y) >> 24 == 0xFF
    }

    /// Reset every pixel to unwritten.
    pub fn clear(&self) {
        for p in &self.pixels {
            p.store(0, Ordering::Relaxed);
        }
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| p.load(Ordering::Relaxed).to_le_bytes())
            .collect()
    }

    /// Snapshot as an `image` buffer.
    pub fn to_image(&self) -> RgbaImage {
        // Length always matches width * height * 4.
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            image::Rgba(self.pixel(x, y).to_le_bytes())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_clamps_and_sets_alpha() {
        let packed = pack_color(Color::new(2.0, -1.0, 0.5));
        assert_eq!(packed.to_le_bytes(), [255, 0, 128, 255]);
    }

    #[test]
    fn test_pack_nan_is_black() {
        let packed = pack_color(Color::new(f32::NAN, 1.0, 0.0));
        assert_eq!(packed.to_le_bytes(), [0, 255, 0, 255]);
    }

    #[test]
    fn test_unpack_round_trip_endpoints() {
        assert_eq!(unpack_color(pack_color(Color::ONE)), Color::ONE);
        assert_eq!(unpack_color(pack_color(Color::ZERO)), Color::ZERO);
    }

    #[test]
    fn test_sensor_starts_unwritten() {
        let sensor = Sensor::new(4, 3);
        assert_eq!(sensor.pixel_count(), 12);
        assert!(!sensor.is_written(3, 2));
        assert_eq!(sensor.pixel(0, 0), 0);
    }

    #[test]
    fn test_sensor_set_and_read() {
        let sensor = Sensor::new(4, 3);
        sensor.set_pixel(2, 1, Color::new(1.0, 0.0, 0.0));
        assert!(sensor.is_written(2, 1));
        assert_eq!(sensor.color(2, 1), Color::new(1.0, 0.0, 0.0));
        assert!(!sensor.is_written(1, 2));

        let bytes = sensor.to_rgba8();
        let offset = (1 * 4 + 2) * 4;
        assert_eq!(&bytes[offset..offset + 4], &[255, 0, 0, 255]);

        let image = sensor.to_image();
        assert_eq!(image.get_pixel(2, 1).0, [255, 0, 0, 255]);

        sensor.clear();
        assert!(!sensor.is_written(2, 1));
    }
}
