//! Raymond - multithreaded CPU ray tracer.
//!
//! Whitted-style renderer: BVH-accelerated nearest-hit and occlusion queries,
//! Lambert + Phong direct lighting with hard shadows, ambient occlusion,
//! emissive surfaces and bounded mirror recursion. Rows (or spiral buckets)
//! are rendered on a fixed-size worker pool that reports progress and honours
//! cooperative cancellation.

mod bucket;
mod bvh;
mod camera;
mod cuboid;
mod error;
mod light;
mod material;
mod plane;
mod renderer;
mod sampling;
mod scene;
pub mod scenes;
mod sensor;
mod settings;
mod sphere;
mod traceable;
mod tracer;

pub use bucket::{generate_buckets, Bucket, DEFAULT_BUCKET_SIZE};
pub use bvh::Bvh;
pub use camera::Camera;
pub use cuboid::Cuboid;
pub use error::{RenderError, RenderResult};
pub use light::{Light, LightInfo, LightKind};
pub use material::{Checkerboard, Color, Material, SolidTexture};
pub use plane::Plane;
pub use renderer::{RenderReport, Renderer};
pub use sampling::{cosine_hemisphere, gen_f32, pixel_seed};
pub use scene::Scene;
pub use sensor::{pack_color, unpack_color, Sensor};
pub use settings::{RenderSettings, WorkPartition};
pub use sphere::Sphere;
pub use traceable::{IntersectInfo, Traceable};
pub use tracer::{TraceContext, Tracer};

/// Re-export Vec3 and common math types from raymond_math
pub use raymond_math::{Aabb, Interval, Mat4, Ray, Transform, Vec3};
