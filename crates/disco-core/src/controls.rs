//! Orbit/zoom camera controller with damping and auto-rotate.
//!
//! The camera orbits `target` on a sphere. Gestures only queue spherical
//! deltas; [`OrbitController::update`] integrates them once per frame so the
//! controller update always happens before the scene is drawn.

use crate::camera::PerspectiveCamera;
use crate::constants::{DAMPING_FACTOR, MIN_POLAR_EPS, ROTATE_SPEED, ZOOM_SPEED};
use glam::Vec3;
use std::f32::consts::{PI, TAU};

#[derive(Clone, Debug, PartialEq)]
pub struct ControlsConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    pub auto_rotate: bool,
    /// Full turns per minute, so 2.0 orbits once every 30 seconds.
    pub auto_rotate_speed: f32,
    pub enable_zoom: bool,
    pub enable_rotate: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            enable_zoom: true,
            enable_rotate: true,
            enable_damping: false,
            damping_factor: DAMPING_FACTOR,
            rotate_speed: ROTATE_SPEED,
            zoom_speed: ZOOM_SPEED,
        }
    }
}

#[derive(Clone, Debug)]
pub struct OrbitController {
    pub config: ControlsConfig,
    pub target: Vec3,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    dragging: bool,
}

impl OrbitController {
    pub fn new(config: ControlsConfig, target: Vec3) -> Self {
        Self {
            config,
            target,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            dragging: false,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn begin_drag(&mut self) {
        if self.config.enable_rotate {
            self.dragging = true;
        }
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Queue an orbit from a pointer move of `(dx, dy)` pixels inside an
    /// element `element_height` pixels tall.
    pub fn orbit_drag(&mut self, dx: f32, dy: f32, element_height: f32) {
        if !self.config.enable_rotate || element_height <= 0.0 {
            return;
        }
        let k = TAU * self.config.rotate_speed / element_height;
        self.rotate_left(dx * k);
        self.rotate_up(dy * k);
    }

    /// Queue a dolly from a wheel event; negative `delta_y` zooms in.
    pub fn zoom(&mut self, delta_y: f32) {
        if !self.config.enable_zoom {
            return;
        }
        let step = 0.95_f32.powf(self.config.zoom_speed);
        if delta_y < 0.0 {
            self.scale *= step;
        } else if delta_y > 0.0 {
            self.scale /= step;
        }
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    fn auto_rotation_angle(&self, dt: f32) -> f32 {
        TAU / 60.0 * self.config.auto_rotate_speed * dt
    }

    /// Integrate queued motion and auto-rotate into `camera`.
    pub fn update(&mut self, camera: &mut PerspectiveCamera, dt: f32) {
        let mut offset = camera.eye - self.target;
        if offset.length_squared() < f32::EPSILON {
            offset = Vec3::Z * self.config.min_distance.max(1e-3);
        }
        let mut radius = offset.length();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        if self.config.auto_rotate && !self.dragging {
            self.rotate_left(self.auto_rotation_angle(dt));
        }

        if self.config.enable_damping {
            theta += self.delta_theta * self.config.damping_factor;
            phi += self.delta_phi * self.config.damping_factor;
        } else {
            theta += self.delta_theta;
            phi += self.delta_phi;
        }
        phi = phi.clamp(MIN_POLAR_EPS, PI - MIN_POLAR_EPS);
        radius = (radius * self.scale)
            .min(self.config.max_distance)
            .max(self.config.min_distance);

        let sin_phi = phi.sin();
        let offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        camera.eye = self.target + offset;
        camera.target = self.target;

        if self.config.enable_damping {
            let keep = 1.0 - self.config.damping_factor;
            self.delta_theta *= keep;
            self.delta_phi *= keep;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.scale = 1.0;
    }
}
