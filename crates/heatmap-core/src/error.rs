//! Error types for heatmap-rs.

use glam::{IVec3, UVec3};
use thiserror::Error;

/// The main error type for heatmap-rs operations.
#[derive(Error, Debug)]
pub enum HeatmapError {
    /// A required input (point set or precomputed field) was not supplied.
    #[error("missing input: {0}")]
    MissingInput(&'static str),

    /// A grid resolution component is negative.
    #[error("resolution must not have negative components, got {0}")]
    NegativeResolution(IVec3),

    /// The grid has more voxels than a field can hold.
    #[error("grid resolution {0} has too many voxels to address")]
    GridTooLarge(UVec3),

    /// The Gaussian standard deviation is not a positive finite number.
    #[error("sigma must be positive and finite, got {0}")]
    InvalidSigma(f32),

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// The colormap definition is unusable.
    #[error("invalid colormap: {0}")]
    InvalidColormap(String),

    /// A colormap lookup table needs at least one entry.
    #[error("colormap resolution must be at least 1")]
    InvalidColormapResolution,

    /// Cutoff percentage outside of `[0, 1]`.
    #[error("cutoff percentage must be within [0, 1], got {0}")]
    InvalidCutoff(f32),

    /// A colormap preset with the given name was not found.
    #[error("colormap '{0}' not found")]
    ColormapNotFound(String),

    /// Backend (GPU) failure.
    #[error("render error: {0}")]
    Render(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HeatmapError {
    /// Returns true for errors caused by the caller's arguments.
    ///
    /// These are fatal to the current call and not retryable without
    /// changing the inputs.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::MissingInput(_)
                | Self::NegativeResolution(_)
                | Self::GridTooLarge(_)
                | Self::InvalidSigma(_)
                | Self::SizeMismatch { .. }
                | Self::InvalidColormap(_)
                | Self::InvalidColormapResolution
                | Self::InvalidCutoff(_)
                | Self::ColormapNotFound(_)
        )
    }
}

/// A specialized Result type for heatmap-rs operations.
pub type Result<T> = std::result::Result<T, HeatmapError>;
