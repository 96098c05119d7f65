//! One camera, one controller, one layout box and one disco ball.

use crate::animation::{AnimationInput, AnimationPolicy, BallPose};
use crate::assets::AssetError;
use crate::ball::{AttachmentSpec, DiscoBall, DiscoBallBuilder};
use crate::camera::{CameraFraming, PerspectiveCamera};
use crate::constants::INNER_COLOR_RGB;
use crate::controls::{ControlsConfig, OrbitController};
use crate::geometry::{normalize, RawSurface};
use crate::primitives::GeometrySource;
use crate::viewport::{ElementRect, LayoutProvider, ViewportRect};
use glam::{Mat4, Vec3};
use smallvec::SmallVec;

/// Everything that distinguishes one viewport from another.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub name: String,
    pub geometry: GeometrySource,
    pub tile_size: f32,
    pub inner_color: [f32; 3],
    pub attachments: SmallVec<[AttachmentSpec; 4]>,
    pub animation: AnimationPolicy,
    pub framing: CameraFraming,
    pub controls: ControlsConfig,
}

impl SceneConfig {
    pub fn new(name: impl Into<String>, geometry: GeometrySource, tile_size: f32) -> Self {
        Self {
            name: name.into(),
            geometry,
            tile_size,
            inner_color: INNER_COLOR_RGB,
            attachments: SmallVec::new(),
            animation: AnimationPolicy::Still,
            framing: CameraFraming::default(),
            controls: ControlsConfig::default(),
        }
    }

    /// Weld `raw` and assemble this scene's ball.
    pub fn build_ball(&self, raw: &RawSurface) -> Result<DiscoBall, AssetError> {
        DiscoBallBuilder::new(normalize(raw), self.tile_size)
            .inner_color(self.inner_color)
            .attach_all(self.attachments.iter().cloned())
            .build()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneState {
    Uninitialized,
    /// Ball attached, not advanced yet.
    Ready,
    Active,
}

pub struct SceneDraw<'a> {
    pub ball: &'a DiscoBall,
    pub view: Mat4,
    pub projection: Mat4,
    pub model: Mat4,
}

pub struct ViewportScene<L> {
    slot: usize,
    config: SceneConfig,
    layout: L,
    camera: PerspectiveCamera,
    controls: OrbitController,
    ball: Option<DiscoBall>,
    pose: BallPose,
    state: SceneState,
    last_rect: Option<ViewportRect>,
}

impl<L: LayoutProvider> ViewportScene<L> {
    pub fn new(slot: usize, config: SceneConfig, layout: L) -> Self {
        let rect = layout.bounding_rect();
        let aspect = rect.width() / (rect.height() * config.framing.vertical_extent);
        let camera = PerspectiveCamera::new(&config.framing, aspect);
        let controls = OrbitController::new(config.controls.clone(), Vec3::ZERO);
        Self {
            slot,
            config,
            layout,
            camera,
            controls,
            ball: None,
            pose: BallPose::default(),
            state: SceneState::Uninitialized,
            last_rect: None,
        }
    }

    /// Install the ball and move to Ready. Only an uninitialized scene takes a
    /// ball: the backend uploads it once at start, so a later ball would never
    /// reach the GPU. Returns whether `ball` was installed.
    pub fn attach_ball(&mut self, ball: DiscoBall) -> bool {
        if self.state != SceneState::Uninitialized {
            log::warn!(
                "[scene] {} ({}) already has a ball; ignoring the new one",
                self.slot,
                self.config.name
            );
            return false;
        }
        self.ball = Some(ball);
        self.state = SceneState::Ready;
        log::info!("[scene] {} ({}) ready", self.slot, self.config.name);
        true
    }

    /// Region for this scene on a surface laid out at `surface`.
    pub fn compute_viewport_rect(&self, surface: ElementRect, pixel_ratio: f32) -> ViewportRect {
        ViewportRect::from_layout(
            self.layout.bounding_rect(),
            surface,
            pixel_ratio,
            self.config.framing.vertical_extent,
        )
    }

    /// Recompute the camera aspect from `rect`. Degenerate rectangles keep
    /// the previous aspect.
    pub fn on_resize(&mut self, rect: &ViewportRect) {
        if let Some(aspect) = rect.aspect() {
            self.camera.set_aspect(aspect);
        }
        self.last_rect = Some(*rect);
    }

    /// Call `on_resize` when the region size differs from the last one seen.
    /// Returns whether it did.
    pub fn sync_rect(&mut self, rect: &ViewportRect) -> bool {
        let changed = match self.last_rect {
            Some(prev) => prev.width != rect.width || prev.height != rect.height,
            None => true,
        };
        if changed {
            self.on_resize(rect);
        }
        changed
    }

    /// Apply the animation policy, then integrate the controller over
    /// `frame_dt` unscaled seconds.
    pub fn advance(&mut self, input: &AnimationInput, frame_dt: f32) {
        if self.state == SceneState::Uninitialized {
            return;
        }
        self.pose = self.config.animation.apply(&self.pose, input);
        self.controls.update(&mut self.camera, frame_dt);
        self.state = SceneState::Active;
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.config.framing.scene_origin) * self.pose.matrix()
    }

    pub fn draw(&self) -> Option<SceneDraw<'_>> {
        let ball = self.ball.as_ref()?;
        Some(SceneDraw {
            ball,
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(),
            model: self.model_matrix(),
        })
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls_mut(&mut self) -> &mut OrbitController {
        &mut self.controls
    }

    pub fn ball(&self) -> Option<&DiscoBall> {
        self.ball.as_ref()
    }

    pub fn pose(&self) -> &BallPose {
        &self.pose
    }

    // Gesture entry points; the controller applies them on the next update.

    pub fn orbit_drag(&mut self, dx: f32, dy: f32) {
        let h = self.layout.bounding_rect().height();
        self.controls.orbit_drag(dx, dy, h);
    }

    pub fn zoom(&mut self, delta_y: f32) {
        self.controls.zoom(delta_y);
    }
}
