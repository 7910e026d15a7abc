//! Stateless building blocks behind [`crate::Heatmap`].
//!
//! Each function validates its input and either returns a complete value or
//! an error. Nothing here touches a renderer.

use heatmap_core::{
    Colormap, ColormapLut, DensityEstimator, FilterMode, GridSettings, HeatmapError,
    LookupTexture, RenderParameters, Result, ScalarField, Vec3,
};

/// Estimates a density field from sample points.
///
/// `None` is rejected. An empty point set is legal and yields an all-zero
/// field.
pub fn generate_from_points(
    estimator: &dyn DensityEstimator,
    settings: &GridSettings,
    points: Option<&[Vec3]>,
) -> Result<ScalarField> {
    let points = points.ok_or(HeatmapError::MissingInput("points"))?;
    let grid = settings.validate()?;

    if points.is_empty() {
        log::warn!("point set for heatmap generation is empty");
    }
    if grid.is_empty() {
        log::warn!(
            "heatmap grid {} has no voxels, producing an empty field",
            grid.resolution()
        );
    }

    estimator.estimate(&grid, points)
}

/// Wraps precomputed heat values as a field.
///
/// The length must equal `nx * ny * nz`; values are never truncated or
/// padded.
pub fn generate_from_field(settings: &GridSettings, values: Option<Vec<f32>>) -> Result<ScalarField> {
    let values = values.ok_or(HeatmapError::MissingInput("heat values"))?;
    let grid = settings.validate()?;
    if grid.is_empty() {
        log::warn!(
            "heatmap grid {} has no voxels, producing an empty field",
            grid.resolution()
        );
    }
    ScalarField::from_values(grid.resolution(), values)
}

/// Packages the scalar parameters for a field.
///
/// `max_heat` comes from the field; everything else is passed through.
pub fn build_render_parameters(
    field: &ScalarField,
    cutoff_percentage: f32,
    render_on_top: bool,
    filter_mode: FilterMode,
) -> RenderParameters {
    RenderParameters {
        max_heat: field.max_value(),
        cutoff_percentage,
        render_on_top,
        filter_mode,
    }
}

/// Samples a colormap into a lookup texture.
pub fn build_lookup(colormap: &Colormap, resolution: usize) -> Result<LookupTexture> {
    Ok(LookupTexture::new(ColormapLut::sample(colormap, resolution)?))
}
