//! Random sampling helpers shared by the camera jitter and ambient occlusion.

use raymond_math::Vec3;
use rand::RngCore;
use std::f32::consts::TAU;

/// Uniform float in `[0, 1)` from the top 24 bits of a `u32`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}

/// Cosine-weighted direction on the hemisphere around the unit `normal`.
pub fn cosine_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let u1 = gen_f32(rng);
    let u2 = gen_f32(rng);
    let r = u1.sqrt();
    let phi = TAU * u2;

    let (tangent, bitangent) = normal.any_orthonormal_pair();
    let local = tangent * (r * phi.cos()) + bitangent * (r * phi.sin());
    (local + normal * (1.0 - u1).max(0.0).sqrt()).normalize()
}

/// Per-pixel RNG seed, independent of which worker renders the pixel.
///
/// SplitMix64 finalizer over the render seed and the pixel index.
pub fn pixel_seed(seed: u64, index: u64) -> u64 {
    let mut z = seed ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
