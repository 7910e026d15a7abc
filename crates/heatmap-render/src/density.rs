//! Density estimation on a wgpu compute kernel.

use std::time::Instant;

use glam::{UVec3, Vec3};
use heatmap_core::density::inv_two_sigma_sq;
use heatmap_core::{DensityEstimator, ScalarField, VoxelGrid};

use crate::buffer;
use crate::context::GpuContext;
use crate::error::{RenderError, RenderResult};

/// Edge length of the cubic compute workgroup. Must match the shader.
const WORKGROUP_EDGE: u32 = 4;

/// Kernel parameters, laid out for a WGSL uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DensityParams {
    pub center: [f32; 3],
    pub inv_two_sigma_sq: f32,
    pub size: [f32; 3],
    pub point_count: u32,
    pub resolution: [u32; 3],
    pub _padding: u32,
}

impl DensityParams {
    /// Builds the parameters for one dispatch.
    pub fn new(grid: &VoxelGrid, point_count: u32) -> Self {
        Self {
            center: grid.center().to_array(),
            inv_two_sigma_sq: inv_two_sigma_sq(grid.sigma()),
            size: grid.size().to_array(),
            point_count,
            resolution: grid.resolution().to_array(),
            _padding: 0,
        }
    }
}

/// Returns the workgroup count needed to cover `resolution`.
#[must_use]
pub fn workgroup_count(resolution: UVec3) -> UVec3 {
    (resolution + UVec3::splat(WORKGROUP_EDGE - 1)) / WORKGROUP_EDGE
}

/// GPU estimator: one dispatch, one blocking readback.
pub struct GpuDensityEstimator {
    ctx: GpuContext,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl GpuDensityEstimator {
    /// Compiles the density kernel on the given context.
    pub fn new(ctx: GpuContext) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gaussian density shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/gaussian_density.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gaussian density bind group layout"),
            entries: &[
                // Params
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Points
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Heat output
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gaussian density pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("gaussian density pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("estimate_density"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        Self {
            ctx,
            pipeline,
            bind_group_layout,
        }
    }

    /// Returns the context this estimator runs on.
    #[must_use]
    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    /// Runs the kernel and reads the field back.
    pub fn run(&self, grid: &VoxelGrid, points: &[Vec3]) -> RenderResult<ScalarField> {
        let voxel_count = grid.voxel_count();
        if voxel_count == 0 || points.is_empty() {
            return Ok(ScalarField::for_grid(grid));
        }

        let device = &self.ctx.device;
        let queue = &self.ctx.queue;
        let start = Instant::now();

        let groups = workgroup_count(grid.resolution());
        let max_groups = device.limits().max_compute_workgroups_per_dimension;
        if let Some(extent) = groups.to_array().into_iter().find(|&g| g > max_groups) {
            return Err(RenderError::GridTooLarge {
                resolution: extent * WORKGROUP_EDGE,
                limit: max_groups * WORKGROUP_EDGE,
            });
        }

        let heat_size = (voxel_count * std::mem::size_of::<f32>()) as u64;
        buffer::check_storage_size(device, "heat", heat_size)?;
        let packed: Vec<[f32; 4]> = points.iter().map(|p| p.extend(0.0).to_array()).collect();
        buffer::check_storage_size(
            device,
            "points",
            (packed.len() * std::mem::size_of::<[f32; 4]>()) as u64,
        )?;

        let point_count = u32::try_from(points.len()).map_err(|_| RenderError::BufferTooLarge {
            label: "points",
            size: points.len() as u64,
            limit: u64::from(u32::MAX),
        })?;

        let params = DensityParams::new(grid, point_count);
        let params_buffer =
            buffer::create_uniform_buffer(device, &params, Some("gaussian density params"));
        let points_buffer =
            buffer::create_storage_buffer(device, &packed, Some("gaussian density points"));
        let heat_buffer =
            buffer::create_output_buffer(device, heat_size, Some("gaussian density heat"));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gaussian density bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: points_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: heat_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("gaussian density encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("gaussian density pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups.x, groups.y, groups.z);
        }
        queue.submit(std::iter::once(encoder.finish()));

        let values: Vec<f32> = buffer::read_buffer(device, queue, &heat_buffer, voxel_count)?;
        log::debug!(
            "gpu density: {} voxels x {} points, {:?} workgroups, {:?}",
            voxel_count,
            points.len(),
            groups,
            start.elapsed()
        );

        ScalarField::from_values(grid.resolution(), values).map_err(|e| {
            RenderError::BufferMapFailed(format!("readback returned a malformed field: {e}"))
        })
    }
}

impl DensityEstimator for GpuDensityEstimator {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn estimate(&self, grid: &VoxelGrid, points: &[Vec3]) -> heatmap_core::Result<ScalarField> {
        Ok(self.run(grid, points)?)
    }
}
