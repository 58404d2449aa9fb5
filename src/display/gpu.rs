//! WebGPU color-convert pipeline for NV12 planes

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, instrument, warn};
use wgpu::util::DeviceExt;
use wgpu::*;
use winit::window::Window;

use super::shader::{
    CHROMA_BINDING, LUMA_BINDING, NV12_SHADER, QUAD_VERTEX_COUNT, QUAD_VERTEX_STRIDE,
    QUAD_VERTICES, SAMPLER_BINDING,
};
use crate::pipeline::FrameSink;
use crate::{ChromaPlane, Error, FrameLayout, LumaPlane, Result};

/// All GPU state needed to turn two planes into a presented RGB image
///
/// Handles are released when the renderer is dropped.
pub struct Nv12Renderer {
    device: Device,
    queue: Queue,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    pipeline: RenderPipeline,
    vertex_buffer: Buffer,
    luma_texture: Texture,
    chroma_texture: Texture,
    bind_group: BindGroup,
    layout: FrameLayout,
    has_frame: bool,
    pub window: Arc<Window>,
}

impl Nv12Renderer {
    /// Initialize WebGPU, compile the shader and allocate both plane textures
    #[instrument(skip_all)]
    pub async fn new(window: Arc<Window>, layout: FrameLayout) -> Result<Self> {
        info!("Initializing WebGPU renderer");
        layout.validate()?;

        let instance = Instance::new(InstanceDescriptor {
            backends: Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| Error::Gpu(format!("failed to create surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| Error::Gpu("no suitable GPU adapter found".into()))?;

        info!("GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("yuvloop device"),
                    required_features: Features::empty(),
                    required_limits: Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| Error::Gpu(format!("failed to create device: {}", e)))?;

        device.on_uncaptured_error(Box::new(|e: wgpu::Error| {
            error!("Uncaptured GPU error: {}", e)
        }));

        let max_dimension = device.limits().max_texture_dimension_2d;
        if layout.width > max_dimension || layout.height > max_dimension {
            return Err(Error::Format(format!(
                "frame size {}x{} exceeds GPU texture limit {}",
                layout.width, layout.height, max_dimension
            )));
        }

        // The shader emits display-ready values; an sRGB target would encode them twice.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| Error::Gpu("surface reports no supported formats".into()))?;

        let size = window.inner_size();
        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };

        surface.configure(&device, &surface_config);

        let luma_texture = Self::create_plane_texture(
            &device,
            "Luma Texture",
            layout.width,
            layout.height,
            TextureFormat::R8Unorm,
        );
        let chroma_texture = Self::create_plane_texture(
            &device,
            "Chroma Texture",
            layout.chroma_width(),
            layout.chroma_height(),
            TextureFormat::Rg8Unorm,
        );

        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some("Plane Sampler"),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            address_mode_w: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: FilterMode::Nearest,
            ..Default::default()
        });

        let (pipeline, bind_group_layout) =
            Self::create_render_pipeline(&device, surface_format).await?;

        let luma_view = luma_texture.create_view(&TextureViewDescriptor::default());
        let chroma_view = chroma_texture.create_view(&TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("NV12 Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: LUMA_BINDING,
                    resource: BindingResource::TextureView(&luma_view),
                },
                BindGroupEntry {
                    binding: CHROMA_BINDING,
                    resource: BindingResource::TextureView(&chroma_view),
                },
                BindGroupEntry {
                    binding: SAMPLER_BINDING,
                    resource: BindingResource::Sampler(&sampler),
                },
            ],
        });

        let vertex_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES[..]),
            usage: BufferUsages::VERTEX,
        });

        info!(
            "Renderer ready: {}x{} luma, {}x{} chroma, surface {:?}",
            layout.width,
            layout.height,
            layout.chroma_width(),
            layout.chroma_height(),
            surface_format
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            pipeline,
            vertex_buffer,
            luma_texture,
            chroma_texture,
            bind_group,
            layout,
            has_frame: false,
            window,
        })
    }

    /// Replace both textures with the given planes
    pub fn upload(&mut self, luma: &LumaPlane, chroma: &ChromaPlane) -> Result<()> {
        if luma.data.len() != self.layout.luma_len()
            || chroma.data.len() != self.layout.chroma_len()
        {
            return Err(Error::Format(
                "plane sizes do not match the renderer's frame layout".into(),
            ));
        }

        let upload_start = Instant::now();

        Self::write_plane(
            &self.queue,
            &self.luma_texture,
            &luma.data,
            luma.width,
            luma.width,
            luma.height,
        );
        Self::write_plane(
            &self.queue,
            &self.chroma_texture,
            &chroma.data,
            chroma.bytes_per_row() as u32,
            chroma.width,
            chroma.height,
        );
        self.has_frame = true;

        metrics::histogram!("upload_time_us").record(upload_start.elapsed().as_micros() as f64);
        Ok(())
    }

    /// Clear the target, draw the quad and present
    pub fn draw(&mut self) -> Result<()> {
        let render_start = Instant::now();

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(SurfaceError::Timeout) => {
                warn!("Timed out acquiring surface texture");
                return Ok(());
            }
            Err(e) => return Err(Error::Gpu(format!("failed to acquire frame: {}", e))),
        };

        let view = output
            .texture
            .create_view(&TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color::BLACK),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        let render_time = render_start.elapsed();
        metrics::histogram!("render_time_us").record(render_time.as_micros() as f64);

        Ok(())
    }

    /// Present the current textures again without uploading
    pub fn redraw(&mut self) -> Result<()> {
        if !self.has_frame {
            return Ok(());
        }
        self.draw()
    }

    /// Resize the presentation surface; the quad always fills it
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    fn create_plane_texture(
        device: &Device,
        label: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Texture {
        device.create_texture(&TextureDescriptor {
            label: Some(label),
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        })
    }

    fn write_plane(
        queue: &Queue,
        texture: &Texture,
        data: &[u8],
        bytes_per_row: u32,
        width: u32,
        height: u32,
    ) {
        queue.write_texture(
            ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            data,
            ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Compile the shader and link the pipeline, failing on any validation error
    async fn create_render_pipeline(
        device: &Device,
        format: TextureFormat,
    ) -> Result<(RenderPipeline, BindGroupLayout)> {
        device.push_error_scope(ErrorFilter::Validation);

        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("NV12 Shader"),
            source: ShaderSource::Wgsl(NV12_SHADER.into()),
        });

        let plane_entry = |binding| BindGroupLayoutEntry {
            binding,
            visibility: ShaderStages::FRAGMENT,
            ty: BindingType::Texture {
                sample_type: TextureSampleType::Float { filterable: true },
                view_dimension: TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("NV12 Bind Group Layout"),
            entries: &[
                plane_entry(LUMA_BINDING),
                plane_entry(CHROMA_BINDING),
                BindGroupLayoutEntry {
                    binding: SAMPLER_BINDING,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("NV12 Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("NV12 Pipeline"),
            layout: Some(&pipeline_layout),
            cache: None,
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[VertexBufferLayout {
                    array_stride: QUAD_VERTEX_STRIDE,
                    step_mode: VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
                }],
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(ColorTargetState {
                    format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
        });

        if let Some(e) = device.pop_error_scope().await {
            return Err(Error::Shader(e.to_string()));
        }

        Ok((pipeline, bind_group_layout))
    }
}

impl FrameSink for Nv12Renderer {
    fn render(&mut self, luma: &LumaPlane, chroma: &ChromaPlane) -> Result<()> {
        self.upload(luma, chroma)?;
        self.draw()
    }
}
