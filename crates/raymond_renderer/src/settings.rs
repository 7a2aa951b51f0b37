//! Render configuration.

use crate::{Color, RenderError, RenderResult, DEFAULT_BUCKET_SIZE};
use serde::{Deserialize, Serialize};

/// How image pixels are divided between workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum WorkPartition {
    /// Static interleaved rows: worker `w` of `n` owns rows `w, w + n, ...`
    Rows,
    /// Square buckets in spiral order, handed out through a shared counter
    Buckets { size: u32 },
}

impl Default for WorkPartition {
    fn default() -> Self {
        Self::Rows
    }
}

/// Render settings; all knobs are fixed for the duration of a render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Mirror recursion cap
    pub max_bounces: u32,
    /// Camera rays per pixel
    pub samples: u32,
    /// Ambient occlusion rays per shaded point (0 disables occlusion)
    pub ao_samples: u32,
    /// Worker thread count
    pub threads: usize,
    /// Maximum distance at which geometry occludes an AO ray
    pub ao_radius: f32,
    /// Offset along the normal for secondary ray origins
    pub shadow_bias: f32,
    /// Color returned by rays that hit nothing
    pub background: Color,
    /// Constant ambient light, scaled by albedo and ambient occlusion
    pub ambient: Color,
    /// Jitter seed; `None` draws a fresh seed for every render
    pub seed: Option<u64>,
    pub partition: WorkPartition,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_bounces: 8,
            samples: 16,
            ao_samples: 2,
            threads: 4,
            ao_radius: 0.5,
            shadow_bias: 1e-3,
            background: Color::ZERO,
            ambient: Color::ZERO,
            seed: None,
            partition: WorkPartition::Rows,
        }
    }
}

impl RenderSettings {
    pub fn with_max_bounces(mut self, max_bounces: u32) -> Self {
        self.max_bounces = max_bounces;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_ao_samples(mut self, ao_samples: u32) -> Self {
        self.ao_samples = ao_samples;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_ao_radius(mut self, ao_radius: f32) -> Self {
        self.ao_radius = ao_radius;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_ambient(mut self, ambient: Color) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_partition(mut self, partition: WorkPartition) -> Self {
        self.partition = partition;
        self
    }

    /// Spiral buckets of the default size.
    pub fn with_buckets(self) -> Self {
        self.with_partition(WorkPartition::Buckets {
            size: DEFAULT_BUCKET_SIZE,
        })
    }

    /// Reject settings that cannot produce an image.
    pub fn validate(&self) -> RenderResult<()> {
        if self.threads == 0 {
            return Err(RenderError::invalid("threads", "must be at least 1"));
        }
        if self.samples == 0 {
            return Err(RenderError::invalid("samples", "must be at least 1"));
        }
        if !(self.shadow_bias.is_finite() && self.shadow_bias >= 0.0) {
            return Err(RenderError::invalid(
                "shadow_bias",
                format!("must be a finite non-negative number, got {}", self.shadow_bias),
            ));
        }
        if !(self.ao_radius.is_finite() && self.ao_radius > 0.0) {
            return Err(RenderError::invalid(
                "ao_radius",
                format!("must be a finite positive number, got {}", self.ao_radius),
            ));
        }
        if let WorkPartition::Buckets { size: 0 } = self.partition {
            return Err(RenderError::invalid("partition", "bucket size must be at least 1"));
        }
        Ok(())
    }
}
