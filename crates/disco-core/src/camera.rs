//! Per-scene perspective camera.

use glam::{Mat4, Vec3};

/// How a scene frames its ball.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraFraming {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// World position of the scene root; the ball is drawn relative to it.
    pub scene_origin: Vec3,
    /// Camera eye relative to `scene_origin`.
    pub eye_offset: Vec3,
    /// The viewport extends this many element-heights upward from the
    /// element's bottom edge.
    pub vertical_extent: f32,
}

impl Default for CameraFraming {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            near: 1.0,
            far: 10.0,
            scene_origin: Vec3::ZERO,
            eye_offset: Vec3::new(0.0, 0.0, 2.0),
            vertical_extent: 1.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
    aspect: f32,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(framing: &CameraFraming, aspect: f32) -> Self {
        let mut cam = Self {
            eye: framing.scene_origin + framing.eye_offset,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fovy_radians: framing.fov_degrees.to_radians(),
            znear: framing.near,
            zfar: framing.far,
            aspect: 1.0,
            projection: Mat4::IDENTITY,
        };
        cam.set_aspect(aspect);
        cam
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Set the aspect ratio and rebuild the projection. Non-finite or
    /// non-positive ratios are ignored.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
        self.update_projection();
    }

    pub fn update_projection(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}
