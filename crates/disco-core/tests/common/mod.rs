// Shared fakes for host-side tests: a mutable layout box and a backend that
// records every call the compositor makes.

#![allow(dead_code)]

use disco_core::*;
use glam::Mat4;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

#[derive(Clone)]
pub struct FakeLayout {
    rect: Rc<Cell<ElementRect>>,
    dpr: f32,
}

impl FakeLayout {
    pub fn new(rect: ElementRect) -> Self {
        Self {
            rect: Rc::new(Cell::new(rect)),
            dpr: 1.0,
        }
    }

    pub fn with_dpr(mut self, dpr: f32) -> Self {
        self.dpr = dpr;
        self
    }

    pub fn set(&self, rect: ElementRect) {
        self.rect.set(rect);
    }
}

impl LayoutProvider for FakeLayout {
    fn bounding_rect(&self) -> ElementRect {
        self.rect.get()
    }

    fn pixel_ratio(&self) -> f32 {
        self.dpr
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Upload(usize),
    BeginFrame,
    ScissorTest(bool),
    Viewport(ViewportRect),
    Scissor(ViewportRect),
    Draw { slot: usize, projection: Mat4 },
    EndFrame,
}

#[derive(Debug)]
pub struct FakeError(pub String);

impl fmt::Display for FakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone)]
pub struct RecordingBackend {
    pub size: SurfaceSize,
    pub calls: Rc<RefCell<Vec<Call>>>,
    pub failing_slots: HashSet<usize>,
}

impl RecordingBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: SurfaceSize { width, height },
            calls: Rc::new(RefCell::new(Vec::new())),
            failing_slots: HashSet::new(),
        }
    }

    pub fn failing(mut self, slot: usize) -> Self {
        self.failing_slots.insert(slot);
        self
    }

    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    fn push(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl RenderBackend for RecordingBackend {
    type Error = FakeError;

    fn surface_size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn upload_ball(&mut self, slot: usize, _ball: &DiscoBall) -> Result<(), FakeError> {
        self.push(Call::Upload(slot));
        Ok(())
    }

    fn begin_frame(&mut self) -> Result<(), FakeError> {
        self.push(Call::BeginFrame);
        Ok(())
    }

    fn set_scissor_test(&mut self, enabled: bool) {
        self.push(Call::ScissorTest(enabled));
    }

    fn set_viewport(&mut self, rect: ViewportRect) {
        self.push(Call::Viewport(rect));
    }

    fn set_scissor(&mut self, rect: ViewportRect) {
        self.push(Call::Scissor(rect));
    }

    fn draw_scene(&mut self, slot: usize, draw: &SceneDraw<'_>) -> Result<(), FakeError> {
        if self.failing_slots.contains(&slot) {
            return Err(FakeError(format!("scene {slot} exploded")));
        }
        self.push(Call::Draw {
            slot,
            projection: draw.projection,
        });
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), FakeError> {
        self.push(Call::EndFrame);
        Ok(())
    }
}

/// Cheap scene: a 12-vertex icosahedron with the given policy.
pub fn small_config(name: &str, animation: AnimationPolicy) -> SceneConfig {
    let mut cfg = SceneConfig::new(
        name,
        GeometrySource::new(Primitive::Icosahedron {
            radius: 0.5,
            detail: 0,
        }),
        0.1,
    );
    cfg.animation = animation;
    cfg
}

pub fn ready_scene(slot: usize, cfg: SceneConfig, layout: FakeLayout) -> ViewportScene<FakeLayout> {
    let raw = cfg.geometry.load().expect("primitive loads");
    let ball = cfg.build_ball(&raw).expect("ball builds");
    let mut scene = ViewportScene::new(slot, cfg, layout);
    assert!(scene.attach_ball(ball));
    scene
}

/// 800x600 surface split into four 400x300 quadrants, row-major from the
/// top-left.
pub fn quadrants() -> Vec<ElementRect> {
    vec![
        ElementRect::new(0.0, 0.0, 400.0, 300.0),
        ElementRect::new(400.0, 0.0, 800.0, 300.0),
        ElementRect::new(0.0, 300.0, 400.0, 600.0),
        ElementRect::new(400.0, 300.0, 800.0, 600.0),
    ]
}
