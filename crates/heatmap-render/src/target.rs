//! GPU-side materialization of heatmap resources.
//!
//! [`GpuHeatmapTarget`] implements [`HeatmapRenderer`] by uploading the
//! volume and lookup tables into wgpu textures and the scalar parameters
//! into a uniform buffer. A volume shader binds [`GpuHeatmapTarget::bind_group`]
//! with the layout from [`GpuHeatmapTarget::bind_group_layout`]:
//!
//! | binding | resource |
//! |---|---|
//! | 0 | `texture_3d<f32>` heat volume |
//! | 1 | volume sampler |
//! | 2 | `texture_1d<f32>` colormap |
//! | 3 | colormap sampler |
//! | 4 | [`HeatmapUniforms`] |

use heatmap_core::{
    FilterMode, HeatmapRenderer, LookupTexture, RenderParameters, VolumeTexture,
};

use crate::buffer;
use crate::context::GpuContext;
use crate::error::{RenderError, RenderResult};

/// Scalar parameters as seen by the volume shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct HeatmapUniforms {
    pub max_heat: f32,
    pub cutoff_percentage: f32,
    /// 1 when fragments should be depth tested against the scene.
    pub use_scene_depth: u32,
    pub _padding: u32,
}

impl From<&RenderParameters> for HeatmapUniforms {
    fn from(params: &RenderParameters) -> Self {
        Self {
            max_heat: params.max_heat,
            cutoff_percentage: params.cutoff_percentage,
            use_scene_depth: u32::from(params.uses_scene_depth()),
            _padding: 0,
        }
    }
}

/// Returns `(mag/min filter, mipmap filter)` for a volume filter mode.
#[must_use]
pub fn volume_filters(mode: FilterMode) -> (wgpu::FilterMode, wgpu::FilterMode) {
    match mode {
        FilterMode::Point => (wgpu::FilterMode::Nearest, wgpu::FilterMode::Nearest),
        FilterMode::Bilinear => (wgpu::FilterMode::Linear, wgpu::FilterMode::Nearest),
        FilterMode::Trilinear => (wgpu::FilterMode::Linear, wgpu::FilterMode::Linear),
    }
}

/// An uploaded heat volume.
pub struct GpuVolume {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    /// The filter mode the renderer was asked for.
    pub requested_filter: FilterMode,
    /// The filter mode actually in effect after any fallback.
    pub filter_mode: FilterMode,
}

/// An uploaded colormap lookup.
pub struct GpuLookup {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Holds the wgpu resources for one heatmap.
///
/// `set_volume` and `set_lookup` create fresh resources and drop the
/// previous ones. `set_parameters` rewrites the uniforms and, when the
/// filter mode changed, swaps the volume sampler.
pub struct GpuHeatmapTarget {
    ctx: GpuContext,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniforms: HeatmapUniforms,
    volume: Option<GpuVolume>,
    lookup: Option<GpuLookup>,
    bind_group: Option<wgpu::BindGroup>,
}

impl GpuHeatmapTarget {
    /// Creates an empty target.
    pub fn new(ctx: GpuContext) -> Self {
        let bind_group_layout = Self::create_bind_group_layout(&ctx);
        let uniforms = HeatmapUniforms::initial();
        let uniform_buffer =
            buffer::create_uniform_buffer(&ctx.device, &uniforms, Some("heatmap uniforms"));
        Self {
            ctx,
            bind_group_layout,
            uniform_buffer,
            uniforms,
            volume: None,
            lookup: None,
            bind_group: None,
        }
    }

    fn create_bind_group_layout(ctx: &GpuContext) -> wgpu::BindGroupLayout {
        let filterable = ctx.float32_filterable();
        let volume_sampler = if filterable {
            wgpu::SamplerBindingType::Filtering
        } else {
            wgpu::SamplerBindingType::NonFiltering
        };

        ctx.device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("heatmap bind group layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable },
                            view_dimension: wgpu::TextureViewDimension::D3,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(volume_sampler),
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D1,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 4,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            })
    }

    /// Returns the layout volume shaders should use.
    #[must_use]
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Returns the bind group once both textures are uploaded.
    #[must_use]
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }

    /// Returns the uploaded volume.
    #[must_use]
    pub fn volume(&self) -> Option<&GpuVolume> {
        self.volume.as_ref()
    }

    /// Returns the uploaded lookup.
    #[must_use]
    pub fn lookup(&self) -> Option<&GpuLookup> {
        self.lookup.as_ref()
    }

    /// Returns the uniform buffer.
    #[must_use]
    pub fn uniform_buffer(&self) -> &wgpu::Buffer {
        &self.uniform_buffer
    }

    /// Returns the last uploaded uniforms.
    #[must_use]
    pub fn uniforms(&self) -> HeatmapUniforms {
        self.uniforms
    }

    fn effective_filter(&self, requested: FilterMode) -> FilterMode {
        if requested != FilterMode::Point && !self.ctx.float32_filterable() {
            log::warn!(
                "adapter cannot filter R32Float textures, using point filtering instead of {requested:?}"
            );
            return FilterMode::Point;
        }
        requested
    }

    /// Returns the volume sampler and the filter mode it really uses.
    fn create_volume_sampler(&self, requested: FilterMode) -> (wgpu::Sampler, FilterMode) {
        let filter_mode = self.effective_filter(requested);
        let (filter, mipmap_filter) = volume_filters(filter_mode);
        let sampler = self.ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("heat volume sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter,
            ..Default::default()
        });
        (sampler, filter_mode)
    }

    fn upload_volume(&self, volume: &VolumeTexture) -> RenderResult<GpuVolume> {
        let dims = volume.dims();
        let limit = self.ctx.limits().max_texture_dimension_3d;
        if let Some(extent) = dims.to_array().into_iter().find(|&d| d > limit) {
            return Err(RenderError::TextureTooLarge {
                label: "heat volume",
                extent,
                limit,
            });
        }

        let size = wgpu::Extent3d {
            width: dims.x,
            height: dims.y,
            depth_or_array_layers: dims.z,
        };
        let texture = self.ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("heat volume texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format: wgpu::TextureFormat::R32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(volume.data()),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(dims.x * 4),
                rows_per_image: Some(dims.y),
            },
            size,
        );

        let (sampler, filter_mode) = self.create_volume_sampler(volume.filter_mode());

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("heat volume view"),
            dimension: Some(wgpu::TextureViewDimension::D3),
            ..Default::default()
        });

        Ok(GpuVolume {
            texture,
            view,
            sampler,
            requested_filter: volume.filter_mode(),
            filter_mode,
        })
    }

    fn upload_lookup(&self, lookup: &LookupTexture) -> RenderResult<GpuLookup> {
        let width = u32::try_from(lookup.width()).unwrap_or(u32::MAX);
        let limit = self.ctx.limits().max_texture_dimension_1d;
        if width > limit {
            return Err(RenderError::TextureTooLarge {
                label: "colormap lookup",
                extent: width,
                limit,
            });
        }

        let size = wgpu::Extent3d {
            width,
            height: 1,
            depth_or_array_layers: 1,
        };
        let texture = self.ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("colormap lookup texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D1,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &lookup.to_rgba8(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(1),
            },
            size,
        );

        let sampler = self.ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("colormap lookup sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("colormap lookup view"),
            dimension: Some(wgpu::TextureViewDimension::D1),
            ..Default::default()
        });

        Ok(GpuLookup {
            texture,
            view,
            sampler,
        })
    }

    fn rebuild_bind_group(&mut self) {
        self.bind_group = match (&self.volume, &self.lookup) {
            (Some(volume), Some(lookup)) => Some(self.ctx.device.create_bind_group(
                &wgpu::BindGroupDescriptor {
                    label: Some("heatmap bind group"),
                    layout: &self.bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&volume.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&volume.sampler),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::TextureView(&lookup.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: wgpu::BindingResource::Sampler(&lookup.sampler),
                        },
                        wgpu::BindGroupEntry {
                            binding: 4,
                            resource: self.uniform_buffer.as_entire_binding(),
                        },
                    ],
                },
            )),
            _ => None,
        };
    }
}

impl HeatmapUniforms {
    fn initial() -> Self {
        Self {
            max_heat: 0.0,
            cutoff_percentage: 1.0,
            use_scene_depth: 1,
            _padding: 0,
        }
    }
}

impl HeatmapRenderer for GpuHeatmapTarget {
    fn set_volume(&mut self, volume: VolumeTexture) -> heatmap_core::Result<()> {
        if volume.field().is_empty() {
            log::warn!(
                "heat volume {:?} has no voxels, clearing the uploaded volume",
                volume.dims()
            );
            self.volume = None;
        } else {
            self.volume = Some(self.upload_volume(&volume)?);
        }
        self.rebuild_bind_group();
        Ok(())
    }

    fn set_lookup(&mut self, lookup: LookupTexture) -> heatmap_core::Result<()> {
        self.lookup = Some(self.upload_lookup(&lookup)?);
        self.rebuild_bind_group();
        Ok(())
    }

    fn set_parameters(&mut self, parameters: &RenderParameters) -> heatmap_core::Result<()> {
        self.uniforms = HeatmapUniforms::from(parameters);
        buffer::update_buffer(&self.ctx.queue, &self.uniform_buffer, &[self.uniforms]);

        // A filter change applies to the uploaded volume without re-uploading it
        let requested = parameters.filter_mode;
        if self
            .volume
            .as_ref()
            .is_some_and(|volume| volume.requested_filter != requested)
        {
            let (sampler, filter_mode) = self.create_volume_sampler(requested);
            if let Some(volume) = self.volume.as_mut() {
                volume.sampler = sampler;
                volume.requested_filter = requested;
                volume.filter_mode = filter_mode;
            }
            self.rebuild_bind_group();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<HeatmapUniforms>(), 16);
    }

    #[test]
    fn test_uniforms_from_parameters() {
        let params = RenderParameters {
            max_heat: 3.5,
            cutoff_percentage: 0.2,
            render_on_top: true,
            filter_mode: FilterMode::Trilinear,
        };
        let uniforms = HeatmapUniforms::from(&params);
        assert_eq!(uniforms.max_heat, 3.5);
        assert_eq!(uniforms.cutoff_percentage, 0.2);
        assert_eq!(uniforms.use_scene_depth, 0);
    }

    #[test]
    fn test_volume_filters() {
        assert_eq!(
            volume_filters(FilterMode::Point),
            (wgpu::FilterMode::Nearest, wgpu::FilterMode::Nearest)
        );
        assert_eq!(
            volume_filters(FilterMode::Bilinear).0,
            wgpu::FilterMode::Linear
        );
        assert_eq!(
            volume_filters(FilterMode::Trilinear),
            (wgpu::FilterMode::Linear, wgpu::FilterMode::Linear)
        );
    }
}
