use crate::helpers;
use crate::mesh::{BallGpu, BallLayouts};
use anyhow::anyhow;
use disco_core::{
    DiscoBall, FacetInstanceRaw, FacetTile, MatcapImage, RenderBackend, SceneDraw, SurfaceSize,
    ViewportRect, FACET_WGSL, SOLID_WGSL,
};
use wgpu::util::DeviceExt;

/// One scene's draw, replayed into its own render pass at `end_frame`.
struct PendingDraw {
    slot: usize,
    viewport: ViewportRect,
    scissor: Option<ViewportRect>,
}

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const NORMAL_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const INSTANCE_ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    1 => Float32x4,
    2 => Float32x4,
    3 => Float32x4,
    4 => Float32x4,
];

fn vec3_buffer_layout(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'_> {
    wgpu::VertexBufferLayout {
        array_stride: (std::mem::size_of::<f32>() * 3) as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

struct FrameInFlight {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

pub struct GpuBackend<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    solid_pipeline: wgpu::RenderPipeline,
    facet_pipeline: wgpu::RenderPipeline,
    camera_bgl: wgpu::BindGroupLayout,
    mesh_bgl: wgpu::BindGroupLayout,

    #[allow(dead_code)]
    matcap_tex: wgpu::Texture, // kept alive for matcap_view
    matcap_view: wgpu::TextureView,
    matcap_sampler: wgpu::Sampler,
    depth: (wgpu::Texture, wgpu::TextureView),
    tile_indices: wgpu::Buffer,

    balls: Vec<Option<BallGpu>>,
    clear_color: wgpu::Color,

    frame: Option<FrameInFlight>,
    pending: Vec<PendingDraw>,
    viewport: ViewportRect,
    scissor: ViewportRect,
    scissor_test: bool,
}

impl<'a> GpuBackend<'a> {
    /// Create the device, configure `target` at `size` device pixels and
    /// upload the shared matcap.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'a>>,
        size: SurfaceSize,
        matcap: &MatcapImage,
        clear_color: [f64; 4],
    ) -> anyhow::Result<Self> {
        let width = size.width.max(1);
        let height = size.height.max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(target)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // default limits: older browser WebGPU builds reject unknown limit fields
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow!(format!("request_device error: {:?}", e)))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        // transparent clears need a compositor that honours alpha
        let alpha_mode = caps
            .alpha_modes
            .iter()
            .copied()
            .find(|m| {
                matches!(
                    m,
                    wgpu::CompositeAlphaMode::PreMultiplied | wgpu::CompositeAlphaMode::PostMultiplied
                )
            })
            .or_else(|| caps.alpha_modes.first().copied())
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!("[gpu] surface {width}x{height} {format:?} {alpha_mode:?}");

        let (matcap_tex, matcap_view) = helpers::create_texture(
            &device,
            "matcap_tex",
            matcap.width,
            matcap.height,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &matcap_tex,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &matcap.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * matcap.width),
                rows_per_image: Some(matcap.height),
            },
            wgpu::Extent3d {
                width: matcap.width,
                height: matcap.height,
                depth_or_array_layers: 1,
            },
        );
        let matcap_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("matcap_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let camera_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_bgl"),
            entries: &[
                helpers::uniform_layout_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let mesh_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mesh_bgl"),
            entries: &[helpers::uniform_layout_entry(0)],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pl"),
            bind_group_layouts: &[&camera_bgl, &mesh_bgl],
            push_constant_ranges: &[],
        });

        let solid_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("solid_shader"),
            source: wgpu::ShaderSource::Wgsl(SOLID_WGSL.into()),
        });
        let facet_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("facet_shader"),
            source: wgpu::ShaderSource::Wgsl(FACET_WGSL.into()),
        });

        // slot 0: positions, slot 1: normals
        let solid_pipeline = helpers::make_mesh_pipeline(
            &device,
            "solid_pipeline",
            &pipeline_layout,
            &solid_shader,
            &[
                vec3_buffer_layout(&POSITION_ATTRS),
                vec3_buffer_layout(&NORMAL_ATTRS),
            ],
            format,
        );
        // slot 0: tile corners, slot 1: per-instance model matrix columns
        let facet_pipeline = helpers::make_mesh_pipeline(
            &device,
            "facet_pipeline",
            &pipeline_layout,
            &facet_shader,
            &[
                vec3_buffer_layout(&POSITION_ATTRS),
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<FacetInstanceRaw>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &INSTANCE_ATTRS,
                },
            ],
            format,
        );

        let tile_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tile_indices"),
            contents: bytemuck::cast_slice(&FacetTile::INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        let depth = helpers::create_depth_texture(&device, width, height);

        let [r, g, b, a] = clear_color;
        Ok(Self {
            surface,
            device,
            queue,
            config,
            solid_pipeline,
            facet_pipeline,
            camera_bgl,
            mesh_bgl,
            matcap_tex,
            matcap_view,
            matcap_sampler,
            depth,
            tile_indices,
            balls: Vec::new(),
            clear_color: wgpu::Color { r, g, b, a },
            frame: None,
            pending: Vec::new(),
            viewport: ViewportRect::new(0, 0, width, height),
            scissor: ViewportRect::new(0, 0, width, height),
            scissor_test: false,
        })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width == self.config.width && height == self.config.height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth = helpers::create_depth_texture(&self.device, width, height);
        log::info!("[gpu] resized to {width}x{height}");
    }

    /// Reconfigure with the current size, e.g. after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn render_pending(&mut self, frame: FrameInFlight) {
        let surface = self.surface_size();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        let mut cleared = false;
        for draw in &self.pending {
            let Some(ball) = self.balls.get(draw.slot).and_then(Option::as_ref) else {
                continue;
            };
            let mut rpass = self.begin_pass(&mut encoder, &frame.view, !cleared);
            cleared = true;
            let (x, y, w, h) = draw.viewport.top_left_origin(surface);
            rpass.set_viewport(x as f32, y as f32, w as f32, h as f32, 0.0, 1.0);
            if let Some(s) = draw.scissor {
                let (x, y, w, h) = s.top_left_origin(surface);
                rpass.set_scissor_rect(x, y, w, h);
            }
            rpass.set_bind_group(0, &ball.camera_bind_group, &[]);

            rpass.set_pipeline(&self.solid_pipeline);
            if let Some(inner) = &ball.inner {
                inner.draw(&mut rpass);
            }
            for a in &ball.attachments {
                a.draw(&mut rpass);
            }
            if let Some(facets) = &ball.facets {
                rpass.set_pipeline(&self.facet_pipeline);
                facets.draw(&mut rpass, &self.tile_indices);
            }
        }
        if !cleared {
            // still clear so stale content never lingers
            let _ = self.begin_pass(&mut encoder, &frame.view, true);
        }
        self.pending.clear();
        self.queue.submit(Some(encoder.finish()));
        frame.texture.present();
    }

    /// Each scene gets fresh depth; colour is cleared only by the first pass.
    fn begin_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        clear: bool,
    ) -> wgpu::RenderPass<'e> {
        let load = if clear {
            wgpu::LoadOp::Clear(self.clear_color)
        } else {
            wgpu::LoadOp::Load
        };
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.1,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }
}

impl RenderBackend for GpuBackend<'_> {
    type Error = anyhow::Error;

    fn surface_size(&self) -> SurfaceSize {
        SurfaceSize {
            width: self.config.width,
            height: self.config.height,
        }
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.resize_if_needed(size.width, size.height);
    }

    fn upload_ball(&mut self, slot: usize, ball: &DiscoBall) -> anyhow::Result<()> {
        let layouts = BallLayouts {
            camera: &self.camera_bgl,
            mesh: &self.mesh_bgl,
            matcap_view: &self.matcap_view,
            sampler: &self.matcap_sampler,
        };
        let gpu = BallGpu::upload(&self.device, &layouts, slot, ball);
        if self.balls.len() <= slot {
            self.balls.resize_with(slot + 1, || None);
        }
        self.balls[slot] = Some(gpu);
        Ok(())
    }

    fn begin_frame(&mut self) -> anyhow::Result<()> {
        self.pending.clear();
        self.frame = None;
        let texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.reconfigure();
                return Err(anyhow!("surface {e}, reconfigured"));
            }
            Err(e) => return Err(anyhow!("surface error: {e}")),
        };
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.frame = Some(FrameInFlight { texture, view });
        Ok(())
    }

    fn set_scissor_test(&mut self, enabled: bool) {
        self.scissor_test = enabled;
    }

    fn set_viewport(&mut self, rect: ViewportRect) {
        self.viewport = rect;
    }

    fn set_scissor(&mut self, rect: ViewportRect) {
        self.scissor = rect;
    }

    fn draw_scene(&mut self, slot: usize, draw: &SceneDraw<'_>) -> anyhow::Result<()> {
        if self.frame.is_none() {
            return Err(anyhow!("draw outside of a frame"));
        }
        let ball = self
            .balls
            .get(slot)
            .and_then(Option::as_ref)
            .ok_or_else(|| anyhow!("scene {slot} was never uploaded"))?;
        ball.write_uniforms(&self.queue, draw.view, draw.projection, draw.model);
        self.pending.push(PendingDraw {
            slot,
            viewport: self.viewport,
            scissor: self.scissor_test.then_some(self.scissor),
        });
        Ok(())
    }

    fn end_frame(&mut self) -> anyhow::Result<()> {
        let frame = self
            .frame
            .take()
            .ok_or_else(|| anyhow!("end_frame without begin_frame"))?;
        self.render_pending(frame);
        Ok(())
    }
}
