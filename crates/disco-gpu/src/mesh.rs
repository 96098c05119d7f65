//! GPU copies of a disco ball: one indexed solid per mesh plus the facet
//! instance buffer. Uploaded once when the session starts.

use disco_core::{DiscoBall, FacetTile, SurfaceGeometry};
use glam::Mat4;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct CameraUniforms {
    pub(crate) view: [[f32; 4]; 4],
    pub(crate) projection: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct MeshUniforms {
    pub(crate) model: [[f32; 4]; 4],
    pub(crate) color: [f32; 4],
}

impl MeshUniforms {
    pub(crate) fn new(model: Mat4, rgb: [f32; 3]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: [rgb[0], rgb[1], rgb[2], 1.0],
        }
    }
}

/// Uniform buffer plus the bind group that exposes it at group 1.
pub(crate) struct MeshBinding {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
}

impl MeshBinding {
    pub(crate) fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<MeshUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    pub(crate) fn write(&self, queue: &wgpu::Queue, uniforms: MeshUniforms) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&uniforms));
    }
}

pub(crate) struct SolidMesh {
    pub(crate) positions: wgpu::Buffer,
    pub(crate) normals: wgpu::Buffer,
    pub(crate) indices: wgpu::Buffer,
    pub(crate) index_count: u32,
    pub(crate) binding: MeshBinding,
    pub(crate) color: [f32; 3],
    pub(crate) local: Mat4,
}

impl SolidMesh {
    /// `None` for geometry with nothing to draw.
    fn upload(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        geometry: &SurfaceGeometry,
        color: [f32; 3],
        local: Mat4,
    ) -> Option<Self> {
        if geometry.is_empty() || geometry.indices().is_empty() {
            return None;
        }
        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(geometry.positions_flat()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let normals = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(geometry.normals_flat()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(geometry.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        Some(Self {
            positions,
            normals,
            indices,
            index_count: geometry.indices().len() as u32,
            binding: MeshBinding::new(device, layout, label),
            color,
            local,
        })
    }

    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_bind_group(1, &self.binding.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.positions.slice(..));
        rpass.set_vertex_buffer(1, self.normals.slice(..));
        rpass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

pub(crate) struct FacetMesh {
    pub(crate) corners: wgpu::Buffer,
    pub(crate) instances: wgpu::Buffer,
    pub(crate) instance_count: u32,
    pub(crate) binding: MeshBinding,
}

impl FacetMesh {
    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, tile_indices: &wgpu::Buffer) {
        rpass.set_bind_group(1, &self.binding.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.corners.slice(..));
        rpass.set_vertex_buffer(1, self.instances.slice(..));
        rpass.set_index_buffer(tile_indices.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..FacetTile::INDICES.len() as u32, 0, 0..self.instance_count);
    }
}

/// Everything needed to draw one scene's ball with its own camera.
pub(crate) struct BallGpu {
    pub(crate) camera_buffer: wgpu::Buffer,
    pub(crate) camera_bind_group: wgpu::BindGroup,
    pub(crate) inner: Option<SolidMesh>,
    pub(crate) facets: Option<FacetMesh>,
    pub(crate) attachments: Vec<SolidMesh>,
}

pub(crate) struct BallLayouts<'a> {
    pub(crate) camera: &'a wgpu::BindGroupLayout,
    pub(crate) mesh: &'a wgpu::BindGroupLayout,
    pub(crate) matcap_view: &'a wgpu::TextureView,
    pub(crate) sampler: &'a wgpu::Sampler,
}

impl BallGpu {
    pub(crate) fn upload(device: &wgpu::Device, layouts: &BallLayouts<'_>, slot: usize, ball: &DiscoBall) -> Self {
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera_uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bg"),
            layout: layouts.camera,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(layouts.matcap_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(layouts.sampler),
                },
            ],
        });

        let inner = SolidMesh::upload(
            device,
            layouts.mesh,
            "inner_mesh",
            &ball.inner.geometry,
            ball.inner.color,
            Mat4::IDENTITY,
        );

        let facets = (ball.facet_count() > 0).then(|| {
            let corners = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("facet_corners"),
                contents: bytemuck::cast_slice(&ball.facets.tile().corners()),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("facet_instances"),
                contents: bytemuck::cast_slice(&ball.facets.instances()),
                usage: wgpu::BufferUsages::VERTEX,
            });
            FacetMesh {
                corners,
                instances,
                instance_count: ball.facet_count() as u32,
                binding: MeshBinding::new(device, layouts.mesh, "facet_mesh"),
            }
        });

        let attachments = ball
            .attachments
            .iter()
            .filter_map(|a| {
                SolidMesh::upload(device, layouts.mesh, "attachment", &a.geometry, a.color, a.local)
            })
            .collect::<Vec<_>>();

        log::info!(
            "[gpu] uploaded scene {slot}: {} facets, {} attachments",
            ball.facet_count(),
            attachments.len()
        );
        Self {
            camera_buffer,
            camera_bind_group,
            inner,
            facets,
            attachments,
        }
    }

    /// Write this frame's camera and model matrices.
    pub(crate) fn write_uniforms(&self, queue: &wgpu::Queue, view: Mat4, projection: Mat4, model: Mat4) {
        let camera = CameraUniforms {
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
        };
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera));
        if let Some(inner) = &self.inner {
            inner
                .binding
                .write(queue, MeshUniforms::new(model * inner.local, inner.color));
        }
        if let Some(facets) = &self.facets {
            facets.binding.write(queue, MeshUniforms::new(model, [1.0; 3]));
        }
        for a in &self.attachments {
            a.binding.write(queue, MeshUniforms::new(model * a.local, a.color));
        }
    }
}
