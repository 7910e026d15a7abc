//! Core types for heatmap-rs.
//!
//! This crate holds everything that does not need a GPU:
//! - [`GridSettings`] / [`VoxelGrid`] for the voxel lattice
//! - [`DensityEstimator`] and the multi-threaded [`CpuDensityEstimator`]
//! - [`ScalarField`] and its max-normalization metadata
//! - [`Colormap`] gradients and [`ColormapLut`] lookup tables
//! - The [`HeatmapRenderer`] contract and its resource types
//! - [`HeatmapOptions`] configuration

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Grid indices are u32 and always fit the usize/f32 conversions used here
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

pub mod colormap;
pub mod density;
pub mod error;
pub mod field;
pub mod grid;
pub mod options;
pub mod render;

pub use colormap::{
    ColorStop, Colormap, ColormapLut, ColormapRegistry, GradientMode, COLORMAP_RESOLUTION,
};
pub use density::{CpuDensityEstimator, DensityEstimator};
pub use error::{HeatmapError, Result};
pub use field::ScalarField;
pub use grid::{GridSettings, VoxelGrid};
pub use options::{ColormapSource, EstimatorBackend, HeatmapOptions};
pub use render::{
    validate_cutoff, FilterMode, HeatmapRenderer, HeatmapResources, LookupTexture, RenderParameters,
    VolumeTexture,
};

// Re-export glam types for convenience
pub use glam::{IVec3, UVec3, Vec3, Vec4};
