//! Frame driver that composites every viewport scene into one surface.
//!
//! The driver is backend-agnostic: it decides rectangles, ordering, timing
//! and failure isolation, and a [`RenderBackend`] turns those decisions into
//! GPU work. Scenes are visited in slot order every frame, and each scene's
//! controller is updated before it is drawn.

use crate::animation::AnimationInput;
use crate::ball::DiscoBall;
use crate::constants::{CLEAR_COLOR_RGBA, DEFAULT_TIME_SCALE, MAX_PIXEL_RATIO};
use crate::scene::{SceneDraw, SceneState, ViewportScene};
use crate::viewport::{LayoutProvider, SurfaceSize, ViewportRect};
use instant::Instant;
use smallvec::SmallVec;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Longest step fed to animation and controllers, so a backgrounded tab does
/// not produce a huge jump when it resumes.
const MAX_FRAME_DT: f32 = 0.25;

/// GPU side of the compositor.
pub trait RenderBackend {
    type Error: fmt::Display;

    fn surface_size(&self) -> SurfaceSize;
    fn resize(&mut self, size: SurfaceSize);
    /// Create GPU resources for the ball drawn in `slot`.
    fn upload_ball(&mut self, slot: usize, ball: &DiscoBall) -> Result<(), Self::Error>;
    fn begin_frame(&mut self) -> Result<(), Self::Error>;
    fn set_scissor_test(&mut self, enabled: bool);
    fn set_viewport(&mut self, rect: ViewportRect);
    fn set_scissor(&mut self, rect: ViewportRect);
    fn draw_scene(&mut self, slot: usize, draw: &SceneDraw<'_>) -> Result<(), Self::Error>;
    fn end_frame(&mut self) -> Result<(), Self::Error>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Multiplier applied to clock deltas before animation policies see them.
    pub time_scale: f32,
    pub max_pixel_ratio: f32,
    pub clear_color: [f64; 4],
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_scale: DEFAULT_TIME_SCALE,
            max_pixel_ratio: MAX_PIXEL_RATIO,
            clear_color: CLEAR_COLOR_RGBA,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("scene {slot} has no ball yet")]
    SceneNotReady { slot: usize },
    #[error("backend error in scene {slot}: {reason}")]
    Backend { slot: usize, reason: String },
    #[error("session already rendering")]
    AlreadyStarted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RendererState {
    Idle,
    Rendering,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    pub dt: f32,
    pub elapsed: f32,
}

#[derive(Clone, Debug)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            start: now,
            last: now,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now.saturating_duration_since(self.last);
        self.last = now.max(self.last);
        FrameTime {
            dt: dt.as_secs_f32().min(MAX_FRAME_DT),
            elapsed: self.last.duration_since(self.start).as_secs_f32(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.last.duration_since(self.start)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to each scene during one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub drawn: SmallVec<[usize; 8]>,
    pub skipped: SmallVec<[usize; 8]>,
    pub failed: SmallVec<[usize; 8]>,
}

pub struct CompositeRenderer<B, L> {
    backend: B,
    surface: L,
    scenes: Vec<ViewportScene<L>>,
    config: SessionConfig,
    clock: FrameClock,
    state: RendererState,
}

impl<B: RenderBackend, L: LayoutProvider> CompositeRenderer<B, L> {
    /// `surface` reports the layout box of the shared canvas/window.
    pub fn new(backend: B, surface: L, scenes: Vec<ViewportScene<L>>, config: SessionConfig) -> Self {
        Self {
            backend,
            surface,
            scenes,
            config,
            clock: FrameClock::new(),
            state: RendererState::Idle,
        }
    }

    /// Upload every ball and enter `Rendering`. Fails without side effects on
    /// the state machine if any scene is still uninitialized.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.start_at(Instant::now())
    }

    pub fn start_at(&mut self, now: Instant) -> Result<(), SessionError> {
        if self.state == RendererState::Rendering {
            return Err(SessionError::AlreadyStarted);
        }
        if let Some(s) = self
            .scenes
            .iter()
            .find(|s| s.state() == SceneState::Uninitialized)
        {
            return Err(SessionError::SceneNotReady { slot: s.slot() });
        }
        for scene in &self.scenes {
            if let Some(ball) = scene.ball() {
                self.backend
                    .upload_ball(scene.slot(), ball)
                    .map_err(|e| SessionError::Backend {
                        slot: scene.slot(),
                        reason: e.to_string(),
                    })?;
            }
        }
        self.on_resize();
        self.clock = FrameClock::starting_at(now);
        self.state = RendererState::Rendering;
        log::info!("[compositor] rendering {} scenes", self.scenes.len());
        Ok(())
    }

    fn pixel_ratio(&self) -> f32 {
        self.surface
            .pixel_ratio()
            .min(self.config.max_pixel_ratio)
            .max(f32::MIN_POSITIVE)
    }

    /// Recompute every scene's camera aspect from its current rectangle.
    /// Safe to call any number of times.
    pub fn on_resize(&mut self) {
        let surface_rect = self.surface.bounding_rect();
        let pr = self.pixel_ratio();
        for scene in &mut self.scenes {
            let rect = scene.compute_viewport_rect(surface_rect, pr);
            scene.on_resize(&rect);
        }
    }

    pub fn resize_surface(&mut self, size: SurfaceSize) {
        if size != self.backend.surface_size() {
            self.backend.resize(size);
        }
        self.on_resize();
    }

    pub fn frame(&mut self) -> FrameReport {
        self.frame_at(Instant::now())
    }

    pub fn frame_at(&mut self, now: Instant) -> FrameReport {
        let mut report = FrameReport::default();
        if self.state != RendererState::Rendering {
            return report;
        }
        let time = self.clock.tick_at(now);
        let surface_rect = self.surface.bounding_rect();
        let pr = self.pixel_ratio();
        let surface_size = self.backend.surface_size();

        if let Err(e) = self.backend.begin_frame() {
            log::warn!("[compositor] frame skipped: {e}");
            report.skipped.extend(self.scenes.iter().map(|s| s.slot()));
            return report;
        }
        self.backend.set_scissor_test(true);

        for scene in &mut self.scenes {
            let slot = scene.slot();
            let rect = scene.compute_viewport_rect(surface_rect, pr);
            scene.sync_rect(&rect);
            let visible = rect.clamp_to(surface_size);
            if let Some(v) = visible {
                self.backend.set_viewport(v);
                self.backend.set_scissor(v);
            }

            scene.advance(
                &AnimationInput {
                    slot,
                    dt: time.dt * self.config.time_scale,
                    elapsed: time.elapsed,
                    surface_css_width: surface_rect.width(),
                },
                time.dt,
            );

            let (Some(visible), false) = (visible, rect.is_degenerate()) else {
                report.skipped.push(slot);
                continue;
            };
            let Some(mut draw) = scene.draw() else {
                report.skipped.push(slot);
                continue;
            };
            draw.projection = rect.clip_correction(&visible) * draw.projection;
            match self.backend.draw_scene(slot, &draw) {
                Ok(()) => report.drawn.push(slot),
                Err(e) => {
                    log::error!("[compositor] scene {slot} draw failed: {e}");
                    report.failed.push(slot);
                }
            }
        }

        if let Err(e) = self.backend.end_frame() {
            log::error!("[compositor] present failed: {e}");
        }
        report
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn scenes(&self) -> &[ViewportScene<L>] {
        &self.scenes
    }

    pub fn scene_mut(&mut self, slot: usize) -> Option<&mut ViewportScene<L>> {
        self.scenes.get_mut(slot)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn surface(&self) -> &L {
        &self.surface
    }
}
