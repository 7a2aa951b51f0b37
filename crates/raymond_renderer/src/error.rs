//! Errors reported by the renderer before a render starts.

use thiserror::Error;

/// Precondition violations detected at `Renderer::render` call time.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render setting `{field}`: {reason}")]
    InvalidSettings { field: &'static str, reason: String },

    #[error("Camera resolution {camera:?} does not match sensor resolution {sensor:?}")]
    ResolutionMismatch { camera: (u32, u32), sensor: (u32, u32) },

    #[error("Sensor has no pixels ({width}x{height})")]
    EmptySensor { width: u32, height: u32 },

    #[error("A render is already running on this renderer")]
    AlreadyRendering,

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type RenderResult<T> = Result<T, RenderError>;

impl RenderError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSettings {
            field,
            reason: reason.into(),
        }
    }
}
