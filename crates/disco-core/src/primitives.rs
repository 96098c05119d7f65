//! Built-in surface generators.
//!
//! All generators emit [`RawSurface`]s with unwelded seams, the way a loaded
//! model would arrive. Seam vertices are computed from wrapped parameters so
//! duplicates are bit-identical and always weld.

use crate::assets::AssetError;
use crate::constants::MAX_ICOSAHEDRON_DETAIL;
use crate::geometry::RawSurface;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Parametric primitive usable as a ball's source geometry.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Icosahedron {
        radius: f32,
        detail: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
    TorusKnot {
        radius: f32,
        tube: f32,
        tubular_segments: u32,
        radial_segments: u32,
        p: u32,
        q: u32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
}

impl Primitive {
    pub fn build(&self) -> Result<RawSurface, AssetError> {
        self.validate()?;
        Ok(match *self {
            Primitive::Icosahedron { radius, detail } => icosahedron(radius, detail),
            Primitive::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => torus(radius, tube, radial_segments, tubular_segments),
            Primitive::TorusKnot {
                radius,
                tube,
                tubular_segments,
                radial_segments,
                p,
                q,
            } => torus_knot(radius, tube, tubular_segments, radial_segments, p, q),
            Primitive::Sphere {
                radius,
                width_segments,
                height_segments,
            } => uv_sphere(radius, width_segments, height_segments),
        })
    }

    fn validate(&self) -> Result<(), AssetError> {
        let bad = |reason: &str| Err(AssetError::InvalidPrimitive(format!("{self:?}: {reason}")));
        let positive = |v: f32| v.is_finite() && v > 0.0;
        match *self {
            Primitive::Icosahedron { radius, detail } => {
                if !positive(radius) {
                    return bad("radius must be positive");
                }
                if detail > MAX_ICOSAHEDRON_DETAIL {
                    return bad("detail too large");
                }
            }
            Primitive::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => {
                if !positive(radius) || !positive(tube) {
                    return bad("radius and tube must be positive");
                }
                if radial_segments < 3 || tubular_segments < 3 {
                    return bad("need at least 3 segments");
                }
            }
            Primitive::TorusKnot {
                radius,
                tube,
                tubular_segments,
                radial_segments,
                p,
                q,
            } => {
                if !positive(radius) || !positive(tube) {
                    return bad("radius and tube must be positive");
                }
                if radial_segments < 3 || tubular_segments < 3 || p == 0 || q == 0 {
                    return bad("need at least 3 segments and non-zero p, q");
                }
            }
            Primitive::Sphere {
                radius,
                width_segments,
                height_segments,
            } => {
                if !positive(radius) {
                    return bad("radius must be positive");
                }
                if width_segments < 3 || height_segments < 2 {
                    return bad("need at least 3x2 segments");
                }
            }
        }
        Ok(())
    }
}

/// Primitive plus the fixed pre-transform a scene applies before welding.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometrySource {
    pub primitive: Primitive,
    pub rotation_x: f32,
    pub offset: Vec3,
}

impl GeometrySource {
    pub fn new(primitive: Primitive) -> Self {
        Self {
            primitive,
            rotation_x: 0.0,
            offset: Vec3::ZERO,
        }
    }

    pub fn rotated_x(mut self, angle: f32) -> Self {
        self.rotation_x = angle;
        self
    }

    /// Offset applied after the rotation.
    pub fn translated(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn load(&self) -> Result<RawSurface, AssetError> {
        let mut raw = self.primitive.build()?;
        if self.rotation_x != 0.0 {
            raw = raw.rotate_x(self.rotation_x);
        }
        if self.offset != Vec3::ZERO {
            raw = raw.translate(self.offset);
        }
        Ok(raw)
    }
}

const ICOSAHEDRON_INDICES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

fn icosahedron_vertices() -> [Vec3; 12] {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
}

/// Geodesic sphere as a triangle soup. Each face is split into
/// `(detail + 1)^2` triangles; after welding there are
/// `10 * (detail + 1)^2 + 2` vertices.
pub fn icosahedron(radius: f32, detail: u32) -> RawSurface {
    let base = icosahedron_vertices();
    let cols = detail as usize + 1;
    let mut positions = Vec::with_capacity(20 * cols * cols * 3);

    for face in ICOSAHEDRON_INDICES {
        // grid[i][j] has barycentric weights (cols - i - j, j, i) over (a, b, c)
        let point = |i: usize, j: usize| -> [f32; 3] {
            let mut terms = [(face[0], cols - i - j), (face[1], j), (face[2], i)];
            // summing in vertex-index order makes shared edge points bit-identical
            terms.sort_unstable_by_key(|&(v, _)| v);
            let mut p = Vec3::ZERO;
            for (v, w) in terms {
                if w > 0 {
                    p += base[v] * (w as f32 / cols as f32);
                }
            }
            (p.normalize() * radius).to_array()
        };
        for i in 0..cols {
            for j in 0..(2 * (cols - i) - 1) {
                let k = j / 2;
                if j % 2 == 0 {
                    positions.push(point(i, k + 1));
                    positions.push(point(i + 1, k));
                    positions.push(point(i, k));
                } else {
                    positions.push(point(i, k + 1));
                    positions.push(point(i + 1, k + 1));
                    positions.push(point(i + 1, k));
                }
            }
        }
    }
    RawSurface::soup(positions)
}

/// Ring torus in the XY plane, indexed with duplicated seam vertices.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> RawSurface {
    let radial = radial_segments as usize;
    let tubular = tubular_segments as usize;
    let mut positions = Vec::with_capacity((radial + 1) * (tubular + 1));
    for j in 0..=radial {
        let v = (j % radial) as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = (i % tubular) as f32 / tubular as f32 * TAU;
            positions.push([
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            ]);
        }
    }
    let mut indices = Vec::with_capacity(radial * tubular * 6);
    let row = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = (row * j + i - 1) as u32;
            let b = (row * (j - 1) + i - 1) as u32;
            let c = (row * (j - 1) + i) as u32;
            let d = (row * j + i) as u32;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    RawSurface::indexed(positions, indices)
}

fn knot_curve(u: f32, p: f32, q: f32, radius: f32) -> Vec3 {
    let cu = u.cos();
    let su = u.sin();
    let qu_over_p = q / p * u;
    let cs = qu_over_p.cos();
    Vec3::new(
        radius * (2.0 + cs) * 0.5 * cu,
        radius * (2.0 + cs) * su * 0.5,
        radius * qu_over_p.sin() * 0.5,
    )
}

/// (p, q) torus knot swept with a circular tube.
pub fn torus_knot(
    radius: f32,
    tube: f32,
    tubular_segments: u32,
    radial_segments: u32,
    p: u32,
    q: u32,
) -> RawSurface {
    let tubular = tubular_segments as usize;
    let radial = radial_segments as usize;
    let (pf, qf) = (p as f32, q as f32);
    let mut positions = Vec::with_capacity((tubular + 1) * (radial + 1));
    for i in 0..=tubular {
        let u = (i % tubular) as f32 / tubular as f32 * pf * TAU;
        let p1 = knot_curve(u, pf, qf, radius);
        let p2 = knot_curve(u + 0.01, pf, qf, radius);
        let t = p2 - p1;
        let n = p2 + p1;
        let b = t.cross(n).normalize();
        let n = b.cross(t).normalize();
        for j in 0..=radial {
            let v = (j % radial) as f32 / radial as f32 * TAU;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            positions.push((p1 + n * cx + b * cy).to_array());
        }
    }
    let mut indices = Vec::with_capacity(tubular * radial * 6);
    let row = radial + 1;
    for j in 1..=tubular {
        for i in 1..=radial {
            let a = (row * (j - 1) + (i - 1)) as u32;
            let b = (row * j + (i - 1)) as u32;
            let c = (row * j + i) as u32;
            let d = (row * (j - 1) + i) as u32;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    RawSurface::indexed(positions, indices)
}

/// Latitude/longitude sphere, used for small decorative attachments.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> RawSurface {
    let w = width_segments as usize;
    let h = height_segments as usize;
    let mut positions = Vec::with_capacity((w + 1) * (h + 1));
    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        for ix in 0..=w {
            let u = (ix % w) as f32 / w as f32;
            positions.push([
                -radius * (u * TAU).cos() * (v * PI).sin(),
                radius * (v * PI).cos(),
                radius * (u * TAU).sin() * (v * PI).sin(),
            ]);
        }
    }
    let row = w + 1;
    let mut indices = Vec::with_capacity(w * h * 6);
    for iy in 0..h {
        for ix in 0..w {
            let a = (row * iy + ix + 1) as u32;
            let b = (row * iy + ix) as u32;
            let c = (row * (iy + 1) + ix) as u32;
            let d = (row * (iy + 1) + ix + 1) as u32;
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    RawSurface::indexed(positions, indices)
}
