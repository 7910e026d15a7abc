//! wgpu backend for heatmap-rs.
//!
//! This crate provides:
//! - A headless [`GpuContext`]
//! - [`GpuDensityEstimator`], the compute-shader density kernel
//! - [`GpuHeatmapTarget`], which uploads heatmap resources into textures

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Buffer sizes are computed in usize and passed to wgpu as u64
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

pub mod buffer;
pub mod context;
pub mod density;
pub mod error;
pub mod target;

pub use context::GpuContext;
pub use density::{DensityParams, GpuDensityEstimator};
pub use error::{RenderError, RenderResult};
pub use target::{GpuHeatmapTarget, GpuLookup, GpuVolume, HeatmapUniforms};
