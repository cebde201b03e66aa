// Presenter - Paints the guest output to the window
//
// The presenter owns the live DisplayConfig consumed every produced
// frame, the guest output image, and (while a window is attached) the
// wgpu surface plus the blit pipeline that stretches the guest image to
// the window. The scaling/sharpening passes themselves are selected by
// the configuration; the paint path here performs the bilinear base case
// and the final-output dither.
//
// All methods are UI-thread-only by contract.

use std::fmt;
use std::sync::Arc;

use winit::window::Window;

use super::config::DisplayConfig;
use super::output::GuestOutput;
use super::overlay::{OverlayFrame, OverlayRenderer};

/// Errors from acquiring a paint surface for a window.
///
/// Surface acquisition failure is not fatal to the shell: the presenter
/// stays surfaceless and painting is skipped until the next attach.
#[derive(Debug)]
pub enum SurfaceInitError {
    /// Creating the window surface failed
    CreateSurface(wgpu::CreateSurfaceError),

    /// No compatible graphics adapter
    RequestAdapter(wgpu::RequestAdapterError),

    /// Device acquisition failed
    RequestDevice(wgpu::RequestDeviceError),
}

impl fmt::Display for SurfaceInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceInitError::CreateSurface(e) => write!(f, "Surface creation error: {}", e),
            SurfaceInitError::RequestAdapter(e) => write!(f, "Adapter request error: {}", e),
            SurfaceInitError::RequestDevice(e) => write!(f, "Device request error: {}", e),
        }
    }
}

impl std::error::Error for SurfaceInitError {}

impl From<wgpu::CreateSurfaceError> for SurfaceInitError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        SurfaceInitError::CreateSurface(e)
    }
}

impl From<wgpu::RequestAdapterError> for SurfaceInitError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        SurfaceInitError::RequestAdapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for SurfaceInitError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        SurfaceInitError::RequestDevice(e)
    }
}

/// GPU state held only while a window is attached.
struct PaintSurface {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    guest_texture: wgpu::Texture,
    params_buffer: wgpu::Buffer,
    backend_name: &'static str,
}

/// Rendering collaborator producing and displaying frames.
///
/// Holds the live [`DisplayConfig`]; changes take effect from the next
/// produced frame.
pub struct Presenter {
    config: DisplayConfig,
    output: GuestOutput,
    surface: Option<PaintSurface>,
}

impl Presenter {
    /// Create a surfaceless presenter at the default guest resolution.
    pub fn new() -> Self {
        let mut output = GuestOutput::default();
        output.test_pattern();
        Self {
            config: DisplayConfig::new(),
            output,
            surface: None,
        }
    }

    /// The configuration consumed when painting the next frame.
    pub fn display_config(&self) -> DisplayConfig {
        self.config
    }

    /// Replace the paint configuration. Takes effect from the next
    /// produced frame.
    pub fn set_display_config(&mut self, config: DisplayConfig) {
        if self.config != config {
            tracing::debug!(?config, "display config updated");
        }
        self.config = config;
    }

    /// The guest output image painted each frame.
    pub fn guest_output(&self) -> &GuestOutput {
        &self.output
    }

    pub fn guest_output_mut(&mut self) -> &mut GuestOutput {
        &mut self.output
    }

    /// Whether a window surface is currently attached.
    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Name of the graphics backend driving the surface.
    pub fn backend_name(&self) -> &'static str {
        match &self.surface {
            Some(surface) => surface.backend_name,
            None => "wgpu",
        }
    }

    /// Device of the attached surface, for overlay resource creation.
    pub(crate) fn device(&self) -> Option<&wgpu::Device> {
        self.surface.as_ref().map(|s| &s.device)
    }

    /// Texture format of the attached surface.
    pub(crate) fn surface_format(&self) -> Option<wgpu::TextureFormat> {
        self.surface.as_ref().map(|s| s.surface_config.format)
    }

    /// Acquire a paint surface for `window`, replacing any previous one.
    pub fn acquire_surface(&mut self, window: Arc<Window>) -> Result<(), SurfaceInitError> {
        self.release_surface();

        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;
        let backend_name = adapter.get_info().backend.to_str();
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("presenter device"),
            ..Default::default()
        }))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(caps.formats[0]);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &surface_config);

        let guest_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("guest output"),
            size: wgpu::Extent3d {
                width: self.output.width(),
                height: self.output.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let guest_view = guest_texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Bilinear is the base scaling mode of the paint path.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("guest output sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("paint params"),
            size: 16,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit bind group layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&guest_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("blit.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blit pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        tracing::info!(backend = backend_name, "paint surface acquired");

        self.surface = Some(PaintSurface {
            surface,
            device,
            queue,
            surface_config,
            pipeline,
            bind_group,
            guest_texture,
            params_buffer,
            backend_name,
        });
        Ok(())
    }

    /// Drop the paint surface. Safe to call while surfaceless.
    pub fn release_surface(&mut self) {
        if self.surface.take().is_some() {
            tracing::debug!("paint surface released");
        }
    }

    /// Resize the attached surface. No-op while surfaceless.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        if let Some(surface) = &mut self.surface {
            surface.surface_config.width = width.max(1);
            surface.surface_config.height = height.max(1);
            surface
                .surface
                .configure(&surface.device, &surface.surface_config);
        }
    }

    /// Paint one frame: guest output blit, then the overlay pass.
    ///
    /// Surface loss is transient; the frame is skipped and the surface
    /// reconfigured for the next one.
    pub fn paint(&mut self, renderer: &mut OverlayRenderer, overlay: Option<OverlayFrame>) {
        let Some(surface) = &mut self.surface else {
            return;
        };

        let frame = match surface.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Outdated) | Err(wgpu::SurfaceError::Lost) => {
                surface
                    .surface
                    .configure(&surface.device, &surface.surface_config);
                return;
            }
            Err(err) => {
                tracing::warn!("dropped frame: {}", err);
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        surface.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &surface.guest_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            self.output.as_rgba(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.output.width()),
                rows_per_image: Some(self.output.height()),
            },
            wgpu::Extent3d {
                width: self.output.width(),
                height: self.output.height(),
                depth_or_array_layers: 1,
            },
        );

        let mut params = [0u8; 16];
        params[0..4].copy_from_slice(&u32::from(self.config.dither()).to_le_bytes());
        surface
            .queue
            .write_buffer(&surface.params_buffer, 0, &params);

        let mut encoder = surface
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("presenter encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("guest output blit"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&surface.pipeline);
            pass.set_bind_group(0, &surface.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        if let Some(overlay) = overlay {
            renderer.paint(&surface.device, &surface.queue, &mut encoder, &view, overlay);
        }

        surface.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::config::ScalingEffect;

    #[test]
    fn test_presenter_starts_surfaceless() {
        let presenter = Presenter::new();
        assert!(!presenter.has_surface());
        assert_eq!(presenter.backend_name(), "wgpu");
    }

    #[test]
    fn test_config_round_trip() {
        let mut presenter = Presenter::new();
        let mut config = DisplayConfig::new();
        config.set_effect(ScalingEffect::Cas);
        config.set_cas_additional_sharpness(0.5);
        presenter.set_display_config(config);
        assert_eq!(presenter.display_config(), config);
    }

    #[test]
    fn test_release_surface_is_noop_when_surfaceless() {
        let mut presenter = Presenter::new();
        presenter.release_surface();
        presenter.resize_surface(100, 100);
        assert!(!presenter.has_surface());
    }
}
