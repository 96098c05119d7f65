// Host-side tests for geometry welding and the built-in primitives.

use disco_core::*;
use glam::Vec3;

fn welded(raw: RawSurface) -> SurfaceGeometry {
    normalize(&raw)
}

#[test]
fn icosahedron_welds_to_geodesic_vertex_count() {
    for detail in 0..4 {
        let g = welded(icosahedron(1.0, detail));
        let n = 10 * (detail as usize + 1).pow(2) + 2;
        assert_eq!(g.vertex_count(), n, "detail {detail}");
        assert_eq!(g.triangle_count(), 20 * (detail as usize + 1).pow(2));
    }
}

#[test]
fn uv_sphere_poles_collapse_to_single_vertices() {
    // 8 columns x 5 interior rings plus two poles
    let g = welded(uv_sphere(1.0, 8, 6));
    assert_eq!(g.vertex_count(), 42);
}

#[test]
fn torus_seams_weld() {
    let g = welded(torus(0.35, 0.2, 12, 24));
    assert_eq!(g.vertex_count(), 12 * 24);
}

#[test]
fn torus_knot_seams_weld() {
    let g = welded(torus_knot(1.0, 0.4, 64, 8, 2, 3));
    assert_eq!(g.vertex_count(), 64 * 8);
}

#[test]
fn normalizing_twice_changes_nothing() {
    let once = welded(icosahedron(0.8, 2));
    let twice = normalize(&once.to_raw());
    assert_eq!(once.vertex_count(), twice.vertex_count());
    assert_eq!(once.indices(), twice.indices());
    for (a, b) in once.normals().iter().zip(twice.normals()) {
        assert!(Vec3::from(*a).abs_diff_eq(Vec3::from(*b), 1e-6));
    }
}

#[test]
fn sphere_normals_are_unit_and_point_outward() {
    let g = welded(icosahedron(0.8, 3));
    for i in 0..g.vertex_count() {
        let n = g.normal(i);
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert!(n.dot(g.position(i).normalize()) > 0.99);
    }
}

#[test]
fn every_welded_attribute_lines_up() {
    let g = welded(torus(1.0, 0.3, 8, 16));
    assert_eq!(g.positions().len(), g.normals().len());
    let n = g.vertex_count() as u32;
    assert!(g.indices().iter().all(|&i| i < n));
    assert_eq!(g.positions_flat().len(), 3 * g.vertex_count());
}

#[test]
fn collapsed_triangles_are_dropped() {
    let raw = RawSurface::soup(vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        // two corners closer than the weld tolerance
        [5.0, 5.0, 5.0],
        [5.0, 5.0, 5.00001],
        [6.0, 5.0, 5.0],
    ]);
    let g = welded(raw);
    assert_eq!(g.triangle_count(), 1);
    assert_eq!(g.vertex_count(), 3);
    assert!(g.normal(0).abs_diff_eq(Vec3::Z, 1e-6));
}

#[test]
fn zero_tolerance_welds_only_identical_positions() {
    for tol in [0.0, -1.0, f32::NAN, 1e-30] {
        let g = normalize_with_tolerance(&icosahedron(1.0, 1), tol);
        assert_eq!(g.vertex_count(), 42, "tolerance {tol}");
        assert_eq!(g.triangle_count(), 80, "tolerance {tol}");
    }

    let raw = RawSurface::soup(vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [-0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 0.0, 0.00001],
    ]);
    let g = normalize_with_tolerance(&raw, 0.0);
    assert_eq!(g.vertex_count(), 4);
    assert_eq!(g.triangle_count(), 2);
    assert_eq!(&g.indices()[3..5], &[0, 1]);
}

#[test]
fn out_of_range_triangles_are_dropped() {
    let raw = RawSurface::indexed(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        vec![0, 1, 2, 0, 1, 9],
    );
    let g = welded(raw);
    assert_eq!(g.triangle_count(), 1);
}

#[test]
fn soup_remainder_is_ignored() {
    let raw = RawSurface::soup(vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [3.0, 3.0, 3.0],
    ]);
    assert_eq!(raw.triangle_count(), 1);
    assert_eq!(welded(raw).vertex_count(), 3);
}

#[test]
fn empty_input_gives_empty_geometry() {
    let g = welded(RawSurface::default());
    assert!(g.is_empty());
    assert_eq!(g.triangle_count(), 0);
    assert_eq!(g.bounding_radius(), 0.0);
}

#[test]
fn stale_normals_are_recomputed() {
    let mut raw = RawSurface::soup(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    raw.normals = Some(vec![[1.0, 0.0, 0.0]; 3]);
    raw.uvs = Some(vec![[0.0, 0.0]; 3]);
    let g = welded(raw);
    assert!(g.normal(1).abs_diff_eq(Vec3::Z, 1e-6));
}

#[test]
fn from_parts_rejects_mismatched_attributes() {
    assert!(SurfaceGeometry::from_parts(vec![[0.0; 3]; 3], vec![[0.0; 3]; 2], vec![0, 1, 2]).is_none());
    assert!(SurfaceGeometry::from_parts(vec![[0.0; 3]; 3], vec![[0.0; 3]; 3], vec![0, 1, 3]).is_none());
    assert!(SurfaceGeometry::from_parts(vec![[0.0; 3]; 3], vec![[0.0; 3]; 3], vec![0, 1]).is_none());
}

#[test]
fn source_transforms_apply_before_welding() {
    let src = GeometrySource::new(Primitive::Icosahedron {
        radius: 0.5,
        detail: 1,
    })
    .translated(Vec3::new(0.0, 2.0, 0.0));
    let g = welded(src.load().expect("valid primitive"));
    let centroid = g
        .positions()
        .iter()
        .fold(Vec3::ZERO, |acc, p| acc + Vec3::from(*p))
        / g.vertex_count() as f32;
    assert!(centroid.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-4));
}

#[test]
fn invalid_primitives_are_rejected() {
    let bad = [
        Primitive::Icosahedron {
            radius: 0.0,
            detail: 1,
        },
        Primitive::Torus {
            radius: 1.0,
            tube: 0.2,
            radial_segments: 2,
            tubular_segments: 8,
        },
        Primitive::TorusKnot {
            radius: 1.0,
            tube: f32::NAN,
            tubular_segments: 64,
            radial_segments: 8,
            p: 2,
            q: 3,
        },
        Primitive::Sphere {
            radius: 1.0,
            width_segments: 3,
            height_segments: 1,
        },
    ];
    for p in bad {
        assert!(matches!(p.build(), Err(AssetError::InvalidPrimitive(_))), "{p:?}");
    }
}
