//! Per-scene animation policies.
//!
//! Each scene picks one policy at construction. Applying a policy is a pure
//! function of the current pose and the frame inputs, so two scenes with the
//! same policy and inputs always end up in the same pose.

use crate::constants::{COMPACT_BREAKPOINT_PX, COMPACT_SCALE, WIDE_SCALE};
use glam::{Mat4, Quat, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpinAxis {
    X,
    Y,
    Z,
}

impl SpinAxis {
    fn rotation(self, angle: f32) -> Quat {
        match self {
            SpinAxis::X => Quat::from_rotation_x(angle),
            SpinAxis::Y => Quat::from_rotation_y(angle),
            SpinAxis::Z => Quat::from_rotation_z(angle),
        }
    }
}

/// Bob along Z, `amplitude * sin(elapsed * frequency + slot)`; the slot
/// offset keeps neighbouring viewports out of phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bob {
    pub amplitude: f32,
    pub frequency: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimationPolicy {
    /// Pose never changes; the orbit controller does all the motion.
    Still,
    /// Rotate about local X then local Z by `rate * dt` each frame.
    Tumble { rate: f32 },
    /// Rotate about one local axis, optionally bobbing.
    Spin {
        axis: SpinAxis,
        rate: f32,
        bob: Option<Bob>,
    },
    /// Fixed yaw with a scale that depends on the surface width.
    Showcase {
        yaw: f32,
        compact_scale: f32,
        wide_scale: f32,
        breakpoint_px: f32,
    },
}

impl AnimationPolicy {
    pub fn spin(axis: SpinAxis, rate: f32) -> Self {
        AnimationPolicy::Spin {
            axis,
            rate,
            bob: None,
        }
    }

    pub fn showcase(yaw: f32) -> Self {
        AnimationPolicy::Showcase {
            yaw,
            compact_scale: COMPACT_SCALE,
            wide_scale: WIDE_SCALE,
            breakpoint_px: COMPACT_BREAKPOINT_PX,
        }
    }

    /// Advance `pose` by one frame.
    pub fn apply(&self, pose: &BallPose, input: &AnimationInput) -> BallPose {
        let mut next = *pose;
        match *self {
            AnimationPolicy::Still => {}
            AnimationPolicy::Tumble { rate } => {
                let d = rate * input.dt;
                next.rotation = (next.rotation * Quat::from_rotation_x(d)).normalize();
                next.rotation = (next.rotation * Quat::from_rotation_z(d)).normalize();
            }
            AnimationPolicy::Spin { axis, rate, bob } => {
                next.rotation = (next.rotation * axis.rotation(rate * input.dt)).normalize();
                if let Some(b) = bob {
                    let phase = input.elapsed * b.frequency + input.slot as f32;
                    next.position.z = phase.sin() * b.amplitude;
                }
            }
            AnimationPolicy::Showcase {
                yaw,
                compact_scale,
                wide_scale,
                breakpoint_px,
            } => {
                let s = if input.surface_css_width < breakpoint_px {
                    compact_scale
                } else {
                    wide_scale
                };
                next.scale = Vec3::splat(s);
                next.rotation = Quat::from_rotation_y(yaw);
            }
        }
        next
    }
}

/// Frame inputs to a policy. `dt` is already multiplied by the session time
/// scale; `elapsed` is unscaled seconds since the session started.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationInput {
    pub slot: usize,
    pub dt: f32,
    pub elapsed: f32,
    pub surface_css_width: f32,
}

/// Ball transform relative to its scene root.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BallPose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for BallPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl BallPose {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}
