//! heatmap-rs: volumetric 3D heatmaps from point samples.
//!
//! Points (gaze hits, hand or head positions, ...) are turned into a
//! continuous density field by Gaussian kernel density estimation over a
//! regular voxel grid. The field, a colormap lookup table and a few scalar
//! parameters are then handed to a renderer for volume rendering.
//!
//! # Quick Start
//!
//! ```no_run
//! use heatmap::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let mut heatmap = Heatmap::new(HeatmapOptions {
//!         center: Vec3::ZERO,
//!         size: Vec3::splat(4.0),
//!         resolution: IVec3::splat(32),
//!         sigma: 0.2,
//!         ..Default::default()
//!     })?;
//!     heatmap.set_cutoff_percentage(0.1)?;
//!
//!     let points = vec![Vec3::new(0.5, 0.0, 0.0), Vec3::new(-0.5, 0.2, 0.1)];
//!     let field = heatmap.generate_from_points(Some(&points))?;
//!     let resources = heatmap.build_resources(field)?;
//!     println!("max heat: {}", resources.parameters.max_heat);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`CpuDensityEstimator`] - multi-threaded with rayon
//! - [`GpuDensityEstimator`] - one wgpu compute dispatch
//!
//! [`EstimatorBackend::Auto`] uses the GPU when an adapter is available.
//!
//! # Renderers
//!
//! Anything implementing [`HeatmapRenderer`] can receive the output.
//! [`GpuHeatmapTarget`] uploads it into wgpu textures and a uniform buffer.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod builder;
mod heatmap;

pub use crate::heatmap::{select_estimator, Heatmap};
pub use builder::{build_lookup, build_render_parameters, generate_from_field, generate_from_points};

// Re-export core types
pub use heatmap_core::{
    colormap::{ColorStop, Colormap, ColormapLut, ColormapRegistry, GradientMode, COLORMAP_RESOLUTION},
    density::{CpuDensityEstimator, DensityEstimator},
    error::{HeatmapError, Result},
    field::ScalarField,
    grid::{GridSettings, VoxelGrid},
    options::{ColormapSource, EstimatorBackend, HeatmapOptions},
    render::{
        validate_cutoff, FilterMode, HeatmapRenderer, HeatmapResources, LookupTexture,
        RenderParameters, VolumeTexture,
    },
    IVec3, UVec3, Vec3, Vec4,
};

// Re-export GPU types
pub use heatmap_render::{
    GpuContext, GpuDensityEstimator, GpuHeatmapTarget, HeatmapUniforms, RenderError,
};

/// Initializes `env_logger` for binaries and demos.
///
/// Honors `RUST_LOG` and defaults to `info`. Calling it twice is harmless.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
