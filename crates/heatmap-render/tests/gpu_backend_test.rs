//! GPU backend integration tests.
//!
//! These tests need a GPU adapter (real or software fallback). When none
//! is available they print a note and return early.

use heatmap_core::{
    Colormap, ColormapLut, CpuDensityEstimator, DensityEstimator, FilterMode, GridSettings,
    HeatmapRenderer, LookupTexture, RenderParameters, ScalarField, UVec3, Vec3, VolumeTexture,
};
use heatmap_render::{GpuContext, GpuDensityEstimator, GpuHeatmapTarget};

fn context_or_skip() -> Option<GpuContext> {
    match GpuContext::new_blocking() {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("Skipping GPU tests: no GPU adapter available ({e})");
            None
        }
    }
}

fn scattered_points(count: usize) -> Vec<Vec3> {
    // Deterministic low-discrepancy spread over [-1, 1]^3
    (0..count)
        .map(|i| {
            let t = i as f32;
            Vec3::new(
                (t * 0.618_034).fract() * 2.0 - 1.0,
                (t * 0.414_214).fract() * 2.0 - 1.0,
                (t * 0.732_051).fract() * 2.0 - 1.0,
            )
        })
        .collect()
}

/// All GPU checks share one test so the adapter is created once.
#[test]
fn gpu_backend_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
    let Some(ctx) = context_or_skip() else {
        return;
    };

    // --- GPU density matches the CPU estimator ---
    {
        let grid = GridSettings::from_bounds(Vec3::ZERO, Vec3::splat(2.0), [9, 7, 5].into(), 0.4)
            .validate()
            .unwrap();
        let points = scattered_points(200);

        let gpu = GpuDensityEstimator::new(ctx.clone());
        let gpu_field = gpu.estimate(&grid, &points).unwrap();
        let cpu_field = CpuDensityEstimator::new().estimate(&grid, &points).unwrap();

        assert_eq!(gpu_field.dims(), cpu_field.dims());
        for (i, (g, c)) in gpu_field
            .values()
            .iter()
            .zip(cpu_field.values())
            .enumerate()
        {
            let tolerance = c.abs() * 1e-4 + 1e-5;
            assert!(
                (g - c).abs() <= tolerance,
                "voxel {i}: gpu {g} vs cpu {c}"
            );
        }
    }

    // --- Empty inputs short-circuit ---
    {
        let gpu = GpuDensityEstimator::new(ctx.clone());
        let grid = GridSettings::from_bounds(Vec3::ZERO, Vec3::ONE, [4, 4, 4].into(), 1.0)
            .validate()
            .unwrap();
        let field = gpu.estimate(&grid, &[]).unwrap();
        assert_eq!(field.len(), 64);
        assert!(field.values().iter().all(|&v| v == 0.0));

        let flat = GridSettings::from_bounds(Vec3::ZERO, Vec3::ONE, [4, 0, 4].into(), 1.0)
            .validate()
            .unwrap();
        let field = gpu.estimate(&flat, &[Vec3::ZERO]).unwrap();
        assert!(field.is_empty());
    }

    // --- Target uploads resources and builds a bind group ---
    {
        let mut target = GpuHeatmapTarget::new(ctx.clone());
        assert!(target.bind_group().is_none());

        let field = ScalarField::from_values(UVec3::new(2, 2, 2), vec![0.5; 8]).unwrap();
        let lut = ColormapLut::sample(
            &Colormap::evenly_spaced("ramp", &[Vec3::ZERO, Vec3::ONE]).unwrap(),
            16,
        )
        .unwrap();

        target
            .set_volume(VolumeTexture::new(field, FilterMode::Trilinear))
            .unwrap();
        assert!(target.bind_group().is_none());
        target.set_lookup(LookupTexture::new(lut)).unwrap();
        target
            .set_parameters(&RenderParameters {
                max_heat: 0.5,
                cutoff_percentage: 0.25,
                render_on_top: true,
                filter_mode: FilterMode::Trilinear,
            })
            .unwrap();

        assert!(target.bind_group().is_some());
        let volume = target.volume().unwrap();
        assert_eq!(volume.texture.dimension(), wgpu::TextureDimension::D3);
        assert_eq!(volume.texture.format(), wgpu::TextureFormat::R32Float);
        if !ctx.float32_filterable() {
            assert_eq!(volume.filter_mode, FilterMode::Point);
        }
        let lookup = target.lookup().unwrap();
        assert_eq!(lookup.texture.width(), 16);
        assert_eq!(target.uniforms().use_scene_depth, 0);
        assert_eq!(target.uniforms().cutoff_percentage, 0.25);

        // A voxel-less volume clears the upload
        target
            .set_volume(VolumeTexture::new(
                ScalarField::zeros(UVec3::new(0, 3, 3)).unwrap(),
                FilterMode::Point,
            ))
            .unwrap();
        assert!(target.volume().is_none());
        assert!(target.bind_group().is_none());
    }

    // --- Filter changes reach an uploaded volume ---
    {
        let gpu = GpuDensityEstimator::new(ctx.clone());
        let filterable = gpu.context().float32_filterable();
        let mut target = GpuHeatmapTarget::new(gpu.context().clone());
        let field = ScalarField::from_values(UVec3::new(2, 2, 2), vec![1.0; 8]).unwrap();
        let lut = ColormapLut::sample(
            &Colormap::evenly_spaced("ramp", &[Vec3::ZERO, Vec3::ONE]).unwrap(),
            8,
        )
        .unwrap();
        target
            .set_volume(VolumeTexture::new(field, FilterMode::Point))
            .unwrap();
        target.set_lookup(LookupTexture::new(lut)).unwrap();
        assert_eq!(target.volume().unwrap().filter_mode, FilterMode::Point);

        target
            .set_parameters(&RenderParameters {
                max_heat: 1.0,
                cutoff_percentage: 0.0,
                render_on_top: false,
                filter_mode: FilterMode::Bilinear,
            })
            .unwrap();

        let volume = target.volume().unwrap();
        assert_eq!(volume.requested_filter, FilterMode::Bilinear);
        let expected = if filterable {
            FilterMode::Bilinear
        } else {
            FilterMode::Point
        };
        assert_eq!(volume.filter_mode, expected);
        assert!(target.bind_group().is_some());
    }

    ctx.wait_idle().unwrap();
}
