#![allow(clippy::cast_precision_loss)]
//! Demo building a gaze heatmap for a simulated VR session.
//!
//! Demonstrates:
//! - Loading options from JSON (or defaults)
//! - Automatic CPU/GPU backend selection
//! - Publishing to a wgpu target when an adapter exists
//!
//! Run with `cargo run --example session_heatmap [options.json]`.

use heatmap::{
    ColormapSource, EstimatorBackend, GpuContext, GpuHeatmapTarget, Heatmap, HeatmapOptions,
    IVec3, Vec3,
};

/// Fake gaze samples: two fixation clusters on a shelf plus a sweep between them.
fn simulated_gaze() -> Vec<Vec3> {
    let shelf_a = Vec3::new(-0.6, 1.2, 0.4);
    let shelf_b = Vec3::new(0.7, 1.0, -0.3);
    let mut points = Vec::new();
    for i in 0..600 {
        let t = i as f32;
        let jitter = Vec3::new((t * 12.9898).sin(), (t * 78.233).sin(), (t * 37.719).sin()) * 0.15;
        let anchor = if i % 3 == 0 { shelf_b } else { shelf_a };
        points.push(anchor + jitter);
    }
    for i in 0..100 {
        points.push(shelf_a.lerp(shelf_b, i as f32 / 99.0));
    }
    points
}

fn main() -> heatmap::Result<()> {
    heatmap::init_logging();

    let options = match std::env::args().nth(1) {
        Some(path) => HeatmapOptions::from_json_file(path)?,
        None => HeatmapOptions {
            center: Vec3::new(0.0, 1.0, 0.0),
            size: Vec3::new(3.0, 2.0, 3.0),
            resolution: IVec3::new(48, 32, 48),
            sigma: 0.1,
            cutoff_percentage: 0.05,
            colormap: ColormapSource::Preset("viridis".into()),
            backend: EstimatorBackend::Auto,
            ..Default::default()
        },
    };
    log::info!("options:\n{}", options.to_json_string()?);

    let heatmap = Heatmap::new(options)?;
    let points = simulated_gaze();

    let start = std::time::Instant::now();
    let field = heatmap.generate_from_points(Some(&points))?;
    log::info!(
        "estimated {} voxels from {} points in {:?} ({} backend)",
        field.len(),
        points.len(),
        start.elapsed(),
        heatmap.estimator_name()
    );

    if let Some(idx) = field.argmax() {
        log::info!(
            "peak density {:.3} at voxel {}",
            field.max_value(),
            field.coords_of(idx)
        );
    }

    match GpuContext::new_blocking() {
        Ok(ctx) => {
            let mut target = GpuHeatmapTarget::new(ctx);
            let params = heatmap.publish(field, &mut target)?;
            log::info!(
                "uploaded to GPU: max heat {:.3}, bind group ready: {}",
                params.max_heat,
                target.bind_group().is_some()
            );
        }
        Err(e) => {
            let resources = heatmap.build_resources(field)?;
            log::warn!("no GPU adapter ({e}), skipping upload");
            log::info!(
                "resources: volume {}, lookup {} entries, max heat {:.3}",
                resources.volume.dims(),
                resources.lookup.width(),
                resources.parameters.max_heat
            );
        }
    }

    Ok(())
}
