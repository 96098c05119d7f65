//! Mirror facet placement.
//!
//! Every welded vertex gets one flat square tile whose front face (+Z in tile
//! space) points along the vertex normal. The transforms are computed once
//! and never touched again; the GPU instance buffer is filled straight from
//! [`FacetBatch::instances`].

use crate::geometry::SurfaceGeometry;
use glam::{Mat3, Mat4, Vec3};

/// Squared cross-product length below which the look direction is treated as
/// parallel to the up reference.
const PARALLEL_EPS: f32 = 1e-8;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FacetInstanceRaw {
    pub model: [[f32; 4]; 4],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FacetTile {
    pub size: f32,
}

impl FacetTile {
    /// Corner positions of the tile quad in the XY plane, counter-clockwise
    /// seen from +Z.
    pub fn corners(&self) -> [[f32; 3]; 4] {
        let h = self.size * 0.5;
        [[-h, -h, 0.0], [h, -h, 0.0], [h, h, 0.0], [-h, h, 0.0]]
    }

    pub const INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];
}

/// Instanced draw batch of oriented mirror tiles.
#[derive(Clone, Debug, PartialEq)]
pub struct FacetBatch {
    tile: FacetTile,
    transforms: Vec<Mat4>,
}

impl FacetBatch {
    /// Place one tile of edge `tile_size` on every vertex of `geometry`.
    pub fn place(geometry: &SurfaceGeometry, tile_size: f32) -> Self {
        let mut transforms = Vec::with_capacity(geometry.vertex_count());
        for i in 0..geometry.vertex_count() {
            transforms.push(facet_transform(geometry.position(i), geometry.normal(i)));
        }
        Self {
            tile: FacetTile { size: tile_size },
            transforms,
        }
    }

    pub fn tile(&self) -> FacetTile {
        self.tile
    }

    pub fn instance_count(&self) -> usize {
        self.transforms.len()
    }

    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    pub fn instances(&self) -> Vec<FacetInstanceRaw> {
        self.transforms
            .iter()
            .map(|m| FacetInstanceRaw {
                model: m.to_cols_array_2d(),
            })
            .collect()
    }
}

/// Transform placing a tile at `position` facing `position + normal`.
pub fn facet_transform(position: Vec3, normal: Vec3) -> Mat4 {
    let basis = look_rotation(normal);
    Mat4::from_cols(
        basis.x_axis.extend(0.0),
        basis.y_axis.extend(0.0),
        basis.z_axis.extend(0.0),
        position.extend(1.0),
    )
}

/// Orthonormal basis whose Z column points along `direction`.
///
/// The up reference is +Y. A direction parallel to +Y switches to +Z, and a
/// zero or non-finite direction is replaced by +Z, so the result is always
/// finite.
pub fn look_rotation(direction: Vec3) -> Mat3 {
    let z = if direction.is_finite() {
        direction.try_normalize().unwrap_or(Vec3::Z)
    } else {
        Vec3::Z
    };
    let mut x = Vec3::Y.cross(z);
    if x.length_squared() < PARALLEL_EPS {
        x = Vec3::Z.cross(z);
    }
    let x = x.normalize();
    let y = z.cross(x);
    Mat3::from_cols(x, y, z)
}
