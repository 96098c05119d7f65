//! Disco ball assembly: an opaque inner mesh, the facet batch and any
//! decorative attachments parented to the inner mesh.

use crate::assets::AssetError;
use crate::constants::{ATTACHMENT_COLOR_RGB, INNER_COLOR_RGB};
use crate::facets::FacetBatch;
use crate::geometry::{normalize, RawSurface, SurfaceGeometry};
use crate::primitives::Primitive;
use glam::{Mat4, Quat, Vec3};

/// Opaque solid drawn underneath the mirrors.
#[derive(Clone, Debug, PartialEq)]
pub struct InnerMesh {
    pub geometry: SurfaceGeometry,
    pub color: [f32; 3],
}

/// Description of a small rigid decoration in ball-local space.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachmentSpec {
    pub shape: Primitive,
    pub offset: Vec3,
    pub scale: f32,
    pub color: [f32; 3],
}

impl AttachmentSpec {
    pub fn sphere(radius: f32, offset: Vec3) -> Self {
        Self {
            shape: Primitive::Sphere {
                radius,
                width_segments: 32,
                height_segments: 32,
            },
            offset,
            scale: 1.0,
            color: ATTACHMENT_COLOR_RGB,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attachment {
    pub geometry: SurfaceGeometry,
    pub local: Mat4,
    pub color: [f32; 3],
}

#[derive(Clone, Debug, PartialEq)]
pub struct DiscoBall {
    pub inner: InnerMesh,
    pub facets: FacetBatch,
    pub attachments: Vec<Attachment>,
}

impl DiscoBall {
    /// Normalize `raw` and build a ball with the default inner colour and no
    /// attachments.
    pub fn from_raw(raw: &RawSurface, tile_size: f32) -> Self {
        DiscoBallBuilder::new(normalize(raw), tile_size).build_plain()
    }

    pub fn vertex_count(&self) -> usize {
        self.inner.geometry.vertex_count()
    }

    pub fn facet_count(&self) -> usize {
        self.facets.instance_count()
    }
}

pub struct DiscoBallBuilder {
    geometry: SurfaceGeometry,
    tile_size: f32,
    inner_color: [f32; 3],
    attachments: Vec<AttachmentSpec>,
}

impl DiscoBallBuilder {
    pub fn new(geometry: SurfaceGeometry, tile_size: f32) -> Self {
        Self {
            geometry,
            tile_size,
            inner_color: INNER_COLOR_RGB,
            attachments: Vec::new(),
        }
    }

    pub fn inner_color(mut self, rgb: [f32; 3]) -> Self {
        self.inner_color = rgb;
        self
    }

    pub fn attach(mut self, spec: AttachmentSpec) -> Self {
        self.attachments.push(spec);
        self
    }

    pub fn attach_all(mut self, specs: impl IntoIterator<Item = AttachmentSpec>) -> Self {
        self.attachments.extend(specs);
        self
    }

    pub fn build(self) -> Result<DiscoBall, AssetError> {
        let facets = FacetBatch::place(&self.geometry, self.tile_size);
        let mut attachments = Vec::with_capacity(self.attachments.len());
        for spec in &self.attachments {
            let raw = spec.shape.build()?;
            attachments.push(Attachment {
                geometry: normalize(&raw),
                local: Mat4::from_scale_rotation_translation(
                    Vec3::splat(spec.scale),
                    Quat::IDENTITY,
                    spec.offset,
                ),
                color: spec.color,
            });
        }
        log::info!(
            "[ball] {} vertices, {} facets, {} attachments",
            self.geometry.vertex_count(),
            facets.instance_count(),
            attachments.len()
        );
        Ok(DiscoBall {
            inner: InnerMesh {
                geometry: self.geometry,
                color: self.inner_color,
            },
            facets,
            attachments,
        })
    }

    fn build_plain(self) -> DiscoBall {
        let facets = FacetBatch::place(&self.geometry, self.tile_size);
        DiscoBall {
            inner: InnerMesh {
                geometry: self.geometry,
                color: self.inner_color,
            },
            facets,
            attachments: Vec::new(),
        }
    }
}
