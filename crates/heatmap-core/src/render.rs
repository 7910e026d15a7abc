//! The contract between the density engine and an external renderer.
//!
//! A renderer receives three things: a 3D single-channel float volume, a 1D
//! RGBA lookup table, and a handful of scalar parameters. The engine never
//! keeps or alters rendering state; it only hands these values over.

use glam::{UVec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::colormap::ColormapLut;
use crate::error::{HeatmapError, Result};
use crate::field::ScalarField;

/// Sampling filter for the volume texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FilterMode {
    /// Nearest voxel.
    Point,
    /// Linear interpolation within the base level.
    #[default]
    Bilinear,
    /// Linear interpolation within and across levels.
    Trilinear,
}

/// Scalar settings passed to the renderer alongside the textures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderParameters {
    /// Largest raw density, used to normalize values to `[0, 1]`.
    pub max_heat: f32,
    /// Normalized density below which fragments are discarded.
    pub cutoff_percentage: f32,
    /// Draw regardless of scene depth when true.
    pub render_on_top: bool,
    /// Volume texture filtering.
    pub filter_mode: FilterMode,
}

impl RenderParameters {
    /// Returns whether the renderer should test against scene depth.
    #[must_use]
    pub fn uses_scene_depth(&self) -> bool {
        !self.render_on_top
    }
}

/// Checks that a cutoff percentage lies in `[0, 1]`.
pub fn validate_cutoff(cutoff_percentage: f32) -> Result<f32> {
    if (0.0..=1.0).contains(&cutoff_percentage) {
        Ok(cutoff_percentage)
    } else {
        Err(HeatmapError::InvalidCutoff(cutoff_percentage))
    }
}

/// A volumetric texture: `nx * ny * nz` single-channel `f32` texels with
/// clamp-to-edge addressing on every axis.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeTexture {
    field: ScalarField,
    filter_mode: FilterMode,
}

impl VolumeTexture {
    /// Wraps a scalar field.
    pub fn new(field: ScalarField, filter_mode: FilterMode) -> Self {
        Self { field, filter_mode }
    }

    /// Returns the texture dimensions.
    #[must_use]
    pub fn dims(&self) -> UVec3 {
        self.field.dims()
    }

    /// Returns the texel data in x-fastest order.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        self.field.values()
    }

    /// Returns the underlying field.
    #[must_use]
    pub fn field(&self) -> &ScalarField {
        &self.field
    }

    /// Returns the filter mode.
    #[must_use]
    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }
}

/// A 1D RGBA lookup texture with clamp-to-edge addressing and linear
/// filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTexture {
    lut: ColormapLut,
}

impl LookupTexture {
    /// Wraps a sampled colormap.
    pub fn new(lut: ColormapLut) -> Self {
        Self { lut }
    }

    /// Returns the number of texels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.lut.len()
    }

    /// Returns the colors.
    #[must_use]
    pub fn colors(&self) -> &[Vec4] {
        self.lut.colors()
    }

    /// Returns the texels as RGBA8.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.lut.to_rgba8()
    }
}

/// Everything a renderer needs to draw one heatmap.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapResources {
    /// Density volume.
    pub volume: VolumeTexture,
    /// Colormap lookup.
    pub lookup: LookupTexture,
    /// Scalar parameters.
    pub parameters: RenderParameters,
}

/// A consumer of heatmap resources.
///
/// Ownership of the texture data moves into the renderer on each call.
/// Every call replaces what was set before.
pub trait HeatmapRenderer {
    /// Replaces the density volume.
    fn set_volume(&mut self, volume: VolumeTexture) -> Result<()>;

    /// Replaces the colormap lookup.
    fn set_lookup(&mut self, lookup: LookupTexture) -> Result<()>;

    /// Replaces the scalar parameters.
    fn set_parameters(&mut self, parameters: &RenderParameters) -> Result<()>;

    /// Publishes a complete resource bundle: volume, then lookup, then
    /// parameters.
    ///
    /// Not atomic. If a later step fails, the earlier ones stay applied and
    /// the parameters are not sent; publish again to recover.
    fn publish(&mut self, resources: HeatmapResources) -> Result<()> {
        self.set_volume(resources.volume)?;
        self.set_lookup(resources.lookup)?;
        self.set_parameters(&resources.parameters)
    }
}
