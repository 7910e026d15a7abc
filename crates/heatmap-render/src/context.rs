//! Headless GPU context.

use std::sync::Arc;

use crate::error::{RenderError, RenderResult};

/// A wgpu device and queue without a surface.
///
/// Cloning is cheap; device and queue are shared.
#[derive(Clone)]
pub struct GpuContext {
    /// The wgpu adapter.
    pub adapter: Arc<wgpu::Adapter>,
    /// The wgpu device.
    pub device: Arc<wgpu::Device>,
    /// The wgpu queue.
    pub queue: Arc<wgpu::Queue>,
    float32_filterable: bool,
}

impl GpuContext {
    /// Creates a headless context on the first high-performance adapter.
    ///
    /// `FLOAT32_FILTERABLE` is requested when the adapter has it so that the
    /// `R32Float` volume can be sampled with linear filtering.
    pub async fn new() -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let info = adapter.get_info();
        log::info!("heatmap GPU adapter: {} ({:?})", info.name, info.backend);

        let float32_filterable = adapter
            .features()
            .contains(wgpu::Features::FLOAT32_FILTERABLE);
        let required_features = if float32_filterable {
            wgpu::Features::FLOAT32_FILTERABLE
        } else {
            wgpu::Features::empty()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("heatmap device (headless)"),
                required_features,
                required_limits: adapter.limits(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        Ok(Self {
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
            float32_filterable,
        })
    }

    /// Blocking wrapper around [`GpuContext::new`].
    pub fn new_blocking() -> RenderResult<Self> {
        pollster::block_on(Self::new())
    }

    /// Returns whether `R32Float` textures may use linear filtering.
    #[must_use]
    pub fn float32_filterable(&self) -> bool {
        self.float32_filterable
    }

    /// Returns the device limits.
    #[must_use]
    pub fn limits(&self) -> wgpu::Limits {
        self.device.limits()
    }

    /// Blocks until all submitted work has finished.
    pub fn wait_idle(&self) -> RenderResult<()> {
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map(|_| ())
            .map_err(|e| RenderError::PollFailed(e.to_string()))
    }
}
