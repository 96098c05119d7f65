// Host-side tests for per-scene animation policies.

use disco_core::*;
use glam::{Quat, Vec3};
use std::f32::consts::PI;

fn input(dt: f32, elapsed: f32) -> AnimationInput {
    AnimationInput {
        slot: 0,
        dt,
        elapsed,
        surface_css_width: 1024.0,
    }
}

#[test]
fn still_never_moves() {
    let pose = BallPose::default();
    let next = AnimationPolicy::Still.apply(&pose, &input(1.0, 10.0));
    assert_eq!(next, pose);
}

#[test]
fn tumble_rotates_about_x_then_z() {
    let next = AnimationPolicy::Tumble { rate: 2.0 }.apply(&BallPose::default(), &input(0.1, 0.1));
    let expected = Quat::from_rotation_x(0.2) * Quat::from_rotation_z(0.2);
    assert!(next.rotation.abs_diff_eq(expected, 1e-6));
    assert_eq!(next.position, Vec3::ZERO);
}

#[test]
fn spin_accumulates_about_its_axis() {
    let policy = AnimationPolicy::spin(SpinAxis::Y, -3.0);
    let mut pose = BallPose::default();
    for _ in 0..10 {
        pose = policy.apply(&pose, &input(0.01, 0.0));
    }
    assert!(pose.rotation.abs_diff_eq(Quat::from_rotation_y(-0.3), 1e-5));
}

#[test]
fn bob_is_offset_by_slot() {
    let policy = AnimationPolicy::Spin {
        axis: SpinAxis::Z,
        rate: 0.0,
        bob: Some(Bob {
            amplitude: 0.02,
            frequency: 1.5,
        }),
    };
    let at = |slot: usize| {
        policy
            .apply(
                &BallPose::default(),
                &AnimationInput {
                    slot,
                    dt: 0.0,
                    elapsed: 2.0,
                    surface_css_width: 800.0,
                },
            )
            .position
            .z
    };
    assert!((at(0) - 0.02 * 3.0_f32.sin()).abs() < 1e-6);
    assert!((at(2) - 0.02 * 5.0_f32.sin()).abs() < 1e-6);
    assert_ne!(at(0), at(1));
}

#[test]
fn showcase_scales_with_surface_width() {
    let policy = AnimationPolicy::showcase(PI);
    let narrow = policy.apply(
        &BallPose::default(),
        &AnimationInput {
            surface_css_width: 500.0,
            ..input(0.0, 0.0)
        },
    );
    assert_eq!(narrow.scale, Vec3::splat(1.0));
    assert!(narrow.rotation.abs_diff_eq(Quat::from_rotation_y(PI), 1e-6));

    let wide = policy.apply(&narrow, &input(0.0, 0.0));
    assert_eq!(wide.scale, Vec3::splat(1.75));
    assert!(wide.rotation.abs_diff_eq(Quat::from_rotation_y(PI), 1e-6));
}

#[test]
fn policies_are_pure() {
    let policy = AnimationPolicy::Tumble { rate: 1.0 };
    let pose = BallPose {
        position: Vec3::new(0.1, 0.2, 0.3),
        rotation: Quat::from_rotation_y(0.4),
        scale: Vec3::ONE,
    };
    let a = policy.apply(&pose, &input(0.016, 1.0));
    let b = policy.apply(&pose, &input(0.016, 1.0));
    assert_eq!(a, b);
}

#[test]
fn pose_matrix_scales_then_rotates_then_translates() {
    let pose = BallPose {
        position: Vec3::new(0.0, 0.0, 1.0),
        rotation: Quat::from_rotation_z(PI / 2.0),
        scale: Vec3::splat(2.0),
    };
    let p = pose.matrix().transform_point3(Vec3::X);
    assert!(p.abs_diff_eq(Vec3::new(0.0, 2.0, 1.0), 1e-6));
}
