use heatmap_core::{
    validate_cutoff, Colormap, ColormapRegistry, ColormapSource, CpuDensityEstimator,
    DensityEstimator, EstimatorBackend, FilterMode, GridSettings, HeatmapOptions,
    HeatmapRenderer, HeatmapResources, IVec3, LookupTexture, RenderParameters, Result,
    ScalarField, Vec3, VolumeTexture, COLORMAP_RESOLUTION,
};
use heatmap_render::{GpuContext, GpuDensityEstimator};

use crate::builder;

/// A configured heatmap generator.
///
/// Holds the grid, kernel and presentation settings, the colormap registry,
/// and the density backend. Generation borrows `&self`; changing settings
/// needs `&mut self`.
pub struct Heatmap {
    options: HeatmapOptions,
    registry: ColormapRegistry,
    colormap: Colormap,
    estimator: Box<dyn DensityEstimator>,
}

impl Heatmap {
    /// Creates a heatmap, picking the density backend from the options.
    pub fn new(options: HeatmapOptions) -> Result<Self> {
        let estimator = select_estimator(options.backend)?;
        Self::with_estimator(options, estimator)
    }

    /// Creates a heatmap with an explicit density backend.
    pub fn with_estimator(
        options: HeatmapOptions,
        estimator: Box<dyn DensityEstimator>,
    ) -> Result<Self> {
        options.validate()?;
        let registry = ColormapRegistry::new();
        let colormap = options.colormap.resolve(&registry)?;
        log::info!(
            "heatmap ready: resolution {}, sigma {}, colormap '{}', {} backend",
            options.resolution,
            options.sigma,
            colormap.name(),
            estimator.name()
        );
        Ok(Self {
            options,
            registry,
            colormap,
            estimator,
        })
    }

    /// Returns the current settings.
    #[must_use]
    pub fn options(&self) -> &HeatmapOptions {
        &self.options
    }

    /// Returns the grid settings for the current bounds, resolution and sigma.
    #[must_use]
    pub fn grid_settings(&self) -> GridSettings {
        self.options.grid_settings()
    }

    /// Returns the active colormap.
    #[must_use]
    pub fn colormap(&self) -> &Colormap {
        &self.colormap
    }

    /// Returns the colormap registry.
    #[must_use]
    pub fn registry(&self) -> &ColormapRegistry {
        &self.registry
    }

    /// Returns the colormap registry for registering custom presets.
    pub fn registry_mut(&mut self) -> &mut ColormapRegistry {
        &mut self.registry
    }

    /// Returns the name of the density backend.
    #[must_use]
    pub fn estimator_name(&self) -> &'static str {
        self.estimator.name()
    }

    // ------------------------------------------------------------------
    // Generation
    // ------------------------------------------------------------------

    /// Estimates a density field from sample points.
    pub fn generate_from_points(&self, points: Option<&[Vec3]>) -> Result<ScalarField> {
        builder::generate_from_points(self.estimator.as_ref(), &self.grid_settings(), points)
    }

    /// Wraps precomputed heat values, checking their length.
    pub fn generate_from_field(&self, values: Option<Vec<f32>>) -> Result<ScalarField> {
        builder::generate_from_field(&self.grid_settings(), values)
    }

    /// Returns the render parameters for a field under the current settings.
    #[must_use]
    pub fn render_parameters(&self, field: &ScalarField) -> RenderParameters {
        builder::build_render_parameters(
            field,
            self.options.cutoff_percentage,
            self.options.render_on_top,
            self.options.filter_mode,
        )
    }

    /// Samples the active colormap at the default resolution.
    pub fn lookup_texture(&self) -> Result<LookupTexture> {
        builder::build_lookup(&self.colormap, COLORMAP_RESOLUTION)
    }

    /// Packages a field with the lookup texture and parameters.
    pub fn build_resources(&self, field: ScalarField) -> Result<HeatmapResources> {
        let parameters = self.render_parameters(&field);
        let lookup = self.lookup_texture()?;
        Ok(HeatmapResources {
            volume: VolumeTexture::new(field, self.options.filter_mode),
            lookup,
            parameters,
        })
    }

    /// Hands a field and its companions to a renderer.
    ///
    /// All resources are built before the renderer is touched, so validation
    /// errors leave it unchanged. A failure inside the renderer can leave it
    /// with the new volume but the previous lookup and parameters (see
    /// [`HeatmapRenderer::publish`]).
    ///
    /// Returns the parameters that were published.
    pub fn publish(
        &self,
        field: ScalarField,
        renderer: &mut dyn HeatmapRenderer,
    ) -> Result<RenderParameters> {
        let resources = self.build_resources(field)?;
        let parameters = resources.parameters;
        renderer.publish(resources)?;
        log::debug!(
            "published heatmap: max heat {}, cutoff {}, on top {}",
            parameters.max_heat,
            parameters.cutoff_percentage,
            parameters.render_on_top
        );
        Ok(parameters)
    }

    /// Estimates a field from points and publishes it.
    pub fn generate_heatmap(
        &self,
        points: Option<&[Vec3]>,
        renderer: &mut dyn HeatmapRenderer,
    ) -> Result<RenderParameters> {
        let field = self.generate_from_points(points)?;
        self.publish(field, renderer)
    }

    /// Publishes precomputed heat values.
    pub fn generate_heatmap_from_values(
        &self,
        values: Option<Vec<f32>>,
        renderer: &mut dyn HeatmapRenderer,
    ) -> Result<RenderParameters> {
        let field = self.generate_from_field(values)?;
        self.publish(field, renderer)
    }

    /// Re-samples the colormap and replaces only the lookup texture.
    pub fn publish_colormap(&self, renderer: &mut dyn HeatmapRenderer) -> Result<()> {
        renderer.set_lookup(self.lookup_texture()?)
    }

    /// Re-sends the scalar parameters for an already published field.
    ///
    /// Use after changing the cutoff, render-on-top or filter settings.
    pub fn publish_parameters(
        &self,
        field: &ScalarField,
        renderer: &mut dyn HeatmapRenderer,
    ) -> Result<RenderParameters> {
        let parameters = self.render_parameters(field);
        renderer.set_parameters(&parameters)?;
        Ok(parameters)
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Switches the colormap. Presets must exist in the registry.
    pub fn set_colormap(&mut self, source: ColormapSource) -> Result<()> {
        self.colormap = source.resolve(&self.registry)?;
        self.options.colormap = source;
        Ok(())
    }

    /// Sets whether the volume draws on top of scene geometry.
    pub fn set_render_on_top(&mut self, render_on_top: bool) {
        self.options.render_on_top = render_on_top;
    }

    /// Sets the volume texture filter.
    pub fn set_filter_mode(&mut self, filter_mode: FilterMode) {
        self.options.filter_mode = filter_mode;
    }

    /// Sets the normalized cutoff. Values outside `[0, 1]` are rejected.
    pub fn set_cutoff_percentage(&mut self, cutoff_percentage: f32) -> Result<()> {
        self.options.cutoff_percentage = validate_cutoff(cutoff_percentage)?;
        Ok(())
    }

    /// Sets the voxel resolution.
    pub fn set_resolution(&mut self, resolution: IVec3) -> Result<()> {
        let mut settings = self.grid_settings();
        settings.resolution = resolution;
        settings.validate()?;
        self.options.resolution = resolution;
        Ok(())
    }

    /// Sets the Gaussian standard deviation.
    pub fn set_sigma(&mut self, sigma: f32) -> Result<()> {
        let mut settings = self.grid_settings();
        settings.sigma = sigma;
        settings.validate()?;
        self.options.sigma = sigma;
        Ok(())
    }

    /// Sets the volume bounds from a center and full size.
    pub fn set_bounds(&mut self, center: Vec3, size: Vec3) {
        self.options.center = center;
        self.options.size = size;
    }
}

impl std::fmt::Debug for Heatmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heatmap")
            .field("options", &self.options)
            .field("colormap", &self.colormap.name())
            .field("estimator", &self.estimator.name())
            .finish_non_exhaustive()
    }
}

/// Builds the density backend for a backend choice.
pub fn select_estimator(backend: EstimatorBackend) -> Result<Box<dyn DensityEstimator>> {
    match backend {
        EstimatorBackend::Cpu => Ok(Box::new(CpuDensityEstimator::new())),
        EstimatorBackend::Gpu => {
            let ctx = GpuContext::new_blocking()?;
            Ok(Box::new(GpuDensityEstimator::new(ctx)))
        }
        EstimatorBackend::Auto => match GpuContext::new_blocking() {
            Ok(ctx) => Ok(Box::new(GpuDensityEstimator::new(ctx))),
            Err(e) => {
                log::info!("no GPU for density estimation ({e}), using CPU");
                Ok(Box::new(CpuDensityEstimator::new()))
            }
        },
    }
}
