//! Surface geometry normalization.
//!
//! Source meshes arrive in whatever shape the primitive generator or loader
//! produced: triangle soups with one vertex per corner, indexed meshes with
//! seams, stale normals and uvs. Facet placement needs exactly one vertex per
//! distinct surface point with a smooth normal, so everything goes through
//! [`normalize`] first.

use crate::constants::WELD_TOLERANCE;
use fnv::FnvHashMap;
use glam::Vec3;

/// Unprocessed triangulated surface as produced by a geometry source.
///
/// When `indices` is `None` the positions are read as a triangle soup, three
/// consecutive positions per triangle.
#[derive(Clone, Debug, Default)]
pub struct RawSurface {
    pub positions: Vec<[f32; 3]>,
    pub indices: Option<Vec<u32>>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub uvs: Option<Vec<[f32; 2]>>,
}

impl RawSurface {
    pub fn soup(positions: Vec<[f32; 3]>) -> Self {
        Self {
            positions,
            ..Default::default()
        }
    }

    pub fn indexed(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices: Some(indices),
            ..Default::default()
        }
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(idx) => idx.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    pub fn map_positions(mut self, f: impl Fn(Vec3) -> Vec3) -> Self {
        for p in &mut self.positions {
            *p = f(Vec3::from(*p)).to_array();
        }
        self
    }

    /// Rotate about the X axis, matching a pre-rotated source primitive.
    pub fn rotate_x(self, angle: f32) -> Self {
        let q = glam::Quat::from_rotation_x(angle);
        self.map_positions(|p| q * p)
    }

    pub fn translate(self, offset: Vec3) -> Self {
        self.map_positions(|p| p + offset)
    }
}

/// Welded surface with per-vertex normals.
///
/// Invariant: `positions.len() == normals.len()` and every index in
/// `indices` is below that length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceGeometry {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl SurfaceGeometry {
    /// Build directly from already-welded parts. Returns `None` when the
    /// attribute lengths disagree or an index is out of range.
    pub fn from_parts(
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        indices: Vec<u32>,
    ) -> Option<Self> {
        if positions.len() != normals.len() || indices.len() % 3 != 0 {
            return None;
        }
        let n = positions.len() as u32;
        if indices.iter().any(|&i| i >= n) {
            return None;
        }
        Some(Self {
            positions,
            normals,
            indices,
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::from(self.positions[i])
    }

    pub fn normal(&self, i: usize) -> Vec3 {
        Vec3::from(self.normals[i])
    }

    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn normals_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Re-read as a raw indexed surface, e.g. to normalize again.
    pub fn to_raw(&self) -> RawSurface {
        RawSurface {
            positions: self.positions.clone(),
            indices: Some(self.indices.clone()),
            normals: Some(self.normals.clone()),
            uvs: None,
        }
    }

    /// Radius of the smallest origin-centred sphere containing every vertex.
    pub fn bounding_radius(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| Vec3::from(*p).length())
            .fold(0.0, f32::max)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum WeldKey {
    Cell(i64, i64, i64),
    Exact(u32, u32, u32),
}

#[inline]
fn exact_key(p: [f32; 3]) -> WeldKey {
    // adding +0.0 folds -0.0 onto +0.0
    let [x, y, z] = p.map(|c| (c + 0.0).to_bits());
    WeldKey::Exact(x, y, z)
}

#[inline]
fn weld_key(p: [f32; 3], inv_tol: Option<f64>) -> WeldKey {
    let Some(inv_tol) = inv_tol else {
        return exact_key(p);
    };
    let [x, y, z] = p.map(|c| (f64::from(c) * inv_tol).round());
    let fits = |c: f64| c.is_finite() && c.abs() < i64::MAX as f64;
    if fits(x) && fits(y) && fits(z) {
        WeldKey::Cell(x as i64, y as i64, z as i64)
    } else {
        exact_key(p)
    }
}

pub fn normalize(raw: &RawSurface) -> SurfaceGeometry {
    normalize_with_tolerance(raw, WELD_TOLERANCE)
}

/// Discard normals/uvs, weld coincident positions and recompute smooth normals.
/// A tolerance that is zero, negative or not finite welds only bit-identical
/// positions.
pub fn normalize_with_tolerance(raw: &RawSurface, tolerance: f32) -> SurfaceGeometry {
    let corners = triangle_corners(raw);
    if corners.is_empty() {
        return SurfaceGeometry::empty();
    }

    let inv_tol = (tolerance.is_finite() && tolerance > 0.0).then(|| 1.0 / f64::from(tolerance));
    let mut lookup: FnvHashMap<WeldKey, u32> = FnvHashMap::default();
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut indices: Vec<u32> = Vec::with_capacity(corners.len());

    for tri in corners.chunks_exact(3) {
        let pts = [
            raw.positions[tri[0] as usize],
            raw.positions[tri[1] as usize],
            raw.positions[tri[2] as usize],
        ];
        let keys = pts.map(|p| weld_key(p, inv_tol));
        // collapsed triangles never emit vertices, so a second pass sees the same set
        if keys[0] == keys[1] || keys[1] == keys[2] || keys[0] == keys[2] {
            continue;
        }
        for (key, p) in keys.into_iter().zip(pts) {
            let idx = *lookup.entry(key).or_insert_with(|| {
                positions.push(p);
                (positions.len() - 1) as u32
            });
            indices.push(idx);
        }
    }

    let normals = compute_vertex_normals(&positions, &indices);
    log::debug!(
        "[geometry] welded {} corners into {} vertices / {} triangles",
        corners.len(),
        positions.len(),
        indices.len() / 3
    );
    SurfaceGeometry {
        positions,
        normals,
        indices,
    }
}

/// Corner list (three source indices per triangle), with out-of-range
/// triangles removed.
fn triangle_corners(raw: &RawSurface) -> Vec<u32> {
    let n = raw.positions.len() as u32;
    match &raw.indices {
        Some(idx) => {
            let mut out = Vec::with_capacity(idx.len());
            let mut dropped = 0usize;
            for tri in idx.chunks_exact(3) {
                if tri.iter().all(|&i| i < n) {
                    out.extend_from_slice(tri);
                } else {
                    dropped += 1;
                }
            }
            if dropped > 0 {
                log::warn!("[geometry] dropped {dropped} triangles with out-of-range indices");
            }
            out
        }
        None => (0..(n / 3) * 3).collect(),
    }
}

/// Area-weighted smooth normals. Vertices touched by no triangle (or only by
/// zero-area ones) keep a zero normal.
pub fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let a = Vec3::from(positions[ia]);
        let b = Vec3::from(positions[ib]);
        let c = Vec3::from(positions[ic]);
        let face = (b - a).cross(c - a);
        acc[ia] += face;
        acc[ib] += face;
        acc[ic] += face;
    }
    acc.into_iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}
