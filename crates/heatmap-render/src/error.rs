//! GPU error types.

use heatmap_core::HeatmapError;
use thiserror::Error;

/// Errors that can occur while talking to the GPU.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// A buffer would exceed the device binding limit.
    #[error("buffer '{label}' needs {size} bytes, device limit is {limit}")]
    BufferTooLarge {
        label: &'static str,
        size: u64,
        limit: u64,
    },

    /// A texture would exceed the device dimension limit.
    #[error("texture '{label}' extent {extent} exceeds device limit {limit}")]
    TextureTooLarge {
        label: &'static str,
        extent: u32,
        limit: u32,
    },

    /// The grid needs more compute workgroups than the device allows.
    #[error("grid resolution {resolution} exceeds the dispatch limit {limit}")]
    GridTooLarge { resolution: u32, limit: u32 },

    /// Mapping a readback buffer failed.
    #[error("buffer mapping failed: {0}")]
    BufferMapFailed(String),

    /// Waiting for the device failed.
    #[error("device poll failed: {0}")]
    PollFailed(String),
}

/// A specialized Result type for GPU operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

impl From<RenderError> for HeatmapError {
    fn from(e: RenderError) -> Self {
        HeatmapError::Render(e.to_string())
    }
}
