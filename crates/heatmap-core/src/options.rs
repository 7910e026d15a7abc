//! Configuration options for a heatmap.

use std::path::Path;

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::colormap::{Colormap, ColormapRegistry};
use crate::error::Result;
use crate::grid::GridSettings;
use crate::render::{validate_cutoff, FilterMode};

/// Which density backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EstimatorBackend {
    /// GPU compute when an adapter is available, CPU otherwise.
    #[default]
    Auto,
    /// Multi-threaded CPU.
    Cpu,
    /// GPU compute; fails if no adapter is available.
    Gpu,
}

/// Where the colormap comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColormapSource {
    /// A named preset from [`ColormapRegistry`].
    Preset(String),
    /// A user-defined gradient.
    Custom(Colormap),
}

impl Default for ColormapSource {
    fn default() -> Self {
        Self::Preset(ColormapRegistry::DEFAULT.to_string())
    }
}

impl ColormapSource {
    /// Resolves the source to a concrete colormap.
    pub fn resolve(&self, registry: &ColormapRegistry) -> Result<Colormap> {
        match self {
            Self::Preset(name) => registry.require(name).cloned(),
            Self::Custom(colormap) => Ok(colormap.clone()),
        }
    }
}

/// Settings for one heatmap instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapOptions {
    /// Center of the heatmap volume.
    pub center: Vec3,

    /// Full size of the heatmap volume.
    pub size: Vec3,

    /// Voxels along each axis.
    pub resolution: IVec3,

    /// Gaussian standard deviation in world units.
    pub sigma: f32,

    /// Normalized density below which the renderer hides fragments.
    pub cutoff_percentage: f32,

    /// Draw the volume on top of scene geometry.
    pub render_on_top: bool,

    /// Volume texture filtering.
    pub filter_mode: FilterMode,

    /// Colormap used for the lookup texture.
    pub colormap: ColormapSource,

    /// Density backend.
    pub backend: EstimatorBackend,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            size: Vec3::ONE,
            resolution: IVec3::splat(64),
            sigma: 1.0,
            cutoff_percentage: 1.0,
            render_on_top: false,
            filter_mode: FilterMode::Bilinear,
            colormap: ColormapSource::default(),
            backend: EstimatorBackend::Auto,
        }
    }
}

impl HeatmapOptions {
    /// Returns the grid settings described by these options.
    #[must_use]
    pub fn grid_settings(&self) -> GridSettings {
        GridSettings::from_bounds(self.center, self.size, self.resolution, self.sigma)
    }

    /// Checks every option that can be checked without a GPU.
    pub fn validate(&self) -> Result<()> {
        self.grid_settings().validate()?;
        validate_cutoff(self.cutoff_percentage)?;
        Ok(())
    }

    /// Parses options from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Reads options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serializes options to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
