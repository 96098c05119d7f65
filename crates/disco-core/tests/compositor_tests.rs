// Host-side tests for the multi-viewport frame driver, run against a
// recording backend.

use disco_core::*;
use glam::Quat;
use instant::Instant;
use std::time::Duration;

mod common;
use common::*;

type Session = CompositeRenderer<RecordingBackend, FakeLayout>;

fn surface() -> FakeLayout {
    FakeLayout::new(ElementRect::from_size(0.0, 0.0, 800.0, 600.0))
}

fn four_scene_session(backend: RecordingBackend, config: SessionConfig) -> (Session, Vec<FakeLayout>) {
    let layouts: Vec<FakeLayout> = quadrants().into_iter().map(FakeLayout::new).collect();
    let scenes = layouts
        .iter()
        .enumerate()
        .map(|(slot, layout)| {
            let cfg = small_config(&format!("s{slot}"), AnimationPolicy::spin(SpinAxis::Z, 1.0));
            ready_scene(slot, cfg, layout.clone())
        })
        .collect();
    (CompositeRenderer::new(backend, surface(), scenes, config), layouts)
}

fn drawn_slots(calls: &[Call]) -> Vec<usize> {
    calls
        .iter()
        .filter_map(|c| match c {
            Call::Draw { slot, .. } => Some(*slot),
            _ => None,
        })
        .collect()
}

#[test]
fn scenes_draw_in_slot_order_inside_their_regions() {
    let backend = RecordingBackend::new(800, 600);
    let (mut session, _) = four_scene_session(backend.clone(), SessionConfig::default());
    let t0 = Instant::now();
    session.start_at(t0).unwrap();
    assert_eq!(
        backend.take_calls(),
        vec![Call::Upload(0), Call::Upload(1), Call::Upload(2), Call::Upload(3)]
    );

    let report = session.frame_at(t0 + Duration::from_millis(16));
    assert_eq!(report.drawn.as_slice(), &[0, 1, 2, 3]);
    assert!(report.skipped.is_empty() && report.failed.is_empty());

    let calls = backend.take_calls();
    assert_eq!(calls[0], Call::BeginFrame);
    assert_eq!(calls[1], Call::ScissorTest(true));
    assert_eq!(calls.last(), Some(&Call::EndFrame));
    assert_eq!(drawn_slots(&calls), vec![0, 1, 2, 3]);

    let scissors: Vec<ViewportRect> = calls
        .iter()
        .filter_map(|c| match c {
            Call::Scissor(r) => Some(*r),
            _ => None,
        })
        .collect();
    assert_eq!(
        scissors,
        vec![
            ViewportRect::new(0, 300, 400, 300),
            ViewportRect::new(400, 300, 400, 300),
            ViewportRect::new(0, 0, 400, 300),
            ViewportRect::new(400, 0, 400, 300),
        ]
    );
    // viewport and scissor are set together, right before each draw
    for w in calls.windows(3) {
        if let Call::Draw { .. } = w[2] {
            assert!(matches!(w[0], Call::Viewport(_)));
            assert!(matches!(w[1], Call::Scissor(_)));
        }
    }
}

#[test]
fn layout_change_updates_only_that_camera() {
    let (mut session, layouts) =
        four_scene_session(RecordingBackend::new(800, 600), SessionConfig::default());
    let t0 = Instant::now();
    session.start_at(t0).unwrap();
    for s in session.scenes() {
        assert!((s.camera().aspect() - 4.0 / 3.0).abs() < 1e-6);
    }

    layouts[0].set(ElementRect::from_size(0.0, 0.0, 200.0, 300.0));
    session.frame_at(t0 + Duration::from_millis(16));
    let aspects: Vec<f32> = session.scenes().iter().map(|s| s.camera().aspect()).collect();
    assert!((aspects[0] - 2.0 / 3.0).abs() < 1e-6);
    for a in &aspects[1..] {
        assert!((a - 4.0 / 3.0).abs() < 1e-6);
    }
}

#[test]
fn failing_scene_does_not_stop_the_others() {
    let backend = RecordingBackend::new(800, 600).failing(1);
    let (mut session, _) = four_scene_session(backend.clone(), SessionConfig::default());
    let t0 = Instant::now();
    session.start_at(t0).unwrap();
    backend.take_calls();

    for i in 1..=3 {
        let report = session.frame_at(t0 + Duration::from_millis(16 * i));
        assert_eq!(report.drawn.as_slice(), &[0, 2, 3]);
        assert_eq!(report.failed.as_slice(), &[1]);
    }
    let calls = backend.take_calls();
    assert_eq!(drawn_slots(&calls), vec![0, 2, 3, 0, 2, 3, 0, 2, 3]);
    assert_eq!(calls.iter().filter(|c| **c == Call::EndFrame).count(), 3);
}

#[test]
fn session_waits_for_every_ball() {
    let backend = RecordingBackend::new(800, 600);
    let layouts: Vec<FakeLayout> = quadrants().into_iter().map(FakeLayout::new).collect();
    let mut scenes: Vec<_> = layouts
        .iter()
        .take(2)
        .enumerate()
        .map(|(slot, l)| ready_scene(slot, small_config("ready", AnimationPolicy::Still), l.clone()))
        .collect();
    scenes.push(ViewportScene::new(
        2,
        small_config("late", AnimationPolicy::Still),
        layouts[2].clone(),
    ));
    let mut session = CompositeRenderer::new(backend.clone(), surface(), scenes, SessionConfig::default());

    assert_eq!(session.start(), Err(SessionError::SceneNotReady { slot: 2 }));
    assert_eq!(session.state(), RendererState::Idle);
    assert_eq!(session.frame(), FrameReport::default());
    assert!(backend.take_calls().is_empty());

    let cfg = session.scenes()[2].config().clone();
    let ball = cfg.build_ball(&cfg.geometry.load().unwrap()).unwrap();
    assert!(session.scene_mut(2).unwrap().attach_ball(ball));
    session.start().unwrap();
    assert_eq!(session.state(), RendererState::Rendering);
    assert_eq!(session.start(), Err(SessionError::AlreadyStarted));
}

#[test]
fn uploaded_ball_cannot_be_swapped() {
    let backend = RecordingBackend::new(800, 600);
    let (mut session, _layouts) = four_scene_session(backend.clone(), SessionConfig::default());
    session.start().unwrap();
    session.frame();
    let before = session.scenes()[0].ball().unwrap().vertex_count();

    let big = DiscoBall::from_raw(&icosahedron(0.5, 2), 0.1);
    assert_ne!(big.vertex_count(), before);
    let scene = session.scene_mut(0).unwrap();
    assert!(!scene.attach_ball(big));
    assert_eq!(scene.ball().unwrap().vertex_count(), before);
    assert_eq!(scene.state(), SceneState::Active);
}

#[test]
fn degenerate_and_offscreen_scenes_are_skipped() {
    let backend = RecordingBackend::new(800, 600);
    let (mut session, layouts) = four_scene_session(backend.clone(), SessionConfig::default());
    layouts[2].set(ElementRect::from_size(0.0, 300.0, 400.0, 0.0));
    layouts[3].set(ElementRect::from_size(900.0, 0.0, 100.0, 100.0));
    let t0 = Instant::now();
    session.start_at(t0).unwrap();
    backend.take_calls();

    let report = session.frame_at(t0 + Duration::from_millis(100));
    assert_eq!(report.drawn.as_slice(), &[0, 1]);
    assert_eq!(report.skipped.as_slice(), &[2, 3]);
    assert_eq!(drawn_slots(&backend.take_calls()), vec![0, 1]);
    // skipped scenes keep animating so they are in step when they reappear
    let z = |slot: usize| session.scenes()[slot].pose().rotation;
    assert!(z(2).abs_diff_eq(z(0), 1e-6));
    assert!(z(3).abs_diff_eq(z(0), 1e-6));
}

#[test]
fn partly_offscreen_scene_gets_a_corrected_projection() {
    let backend = RecordingBackend::new(800, 600);
    let (mut session, layouts) = four_scene_session(backend.clone(), SessionConfig::default());
    // hangs 100px off the left edge
    layouts[0].set(ElementRect::from_size(-100.0, 0.0, 400.0, 300.0));
    let t0 = Instant::now();
    session.start_at(t0).unwrap();
    backend.take_calls();
    session.frame_at(t0 + Duration::from_millis(16));

    let calls = backend.take_calls();
    assert!(calls.contains(&Call::Scissor(ViewportRect::new(0, 300, 300, 300))));
    let projection = calls
        .iter()
        .find_map(|c| match c {
            Call::Draw { slot: 0, projection } => Some(*projection),
            _ => None,
        })
        .unwrap();
    let scene = &session.scenes()[0];
    assert!(!projection.abs_diff_eq(scene.camera().projection_matrix(), 1e-6));
    // the camera keeps the aspect of the full element box
    assert!((scene.camera().aspect() - 4.0 / 3.0).abs() < 1e-6);
}

#[test]
fn time_scale_slows_animation_but_not_the_clock() {
    let backend = RecordingBackend::new(800, 600);
    let (mut session, _) = four_scene_session(backend, SessionConfig::default());
    let t0 = Instant::now();
    session.start_at(t0).unwrap();
    session.frame_at(t0 + Duration::from_millis(200));
    let rot = session.scenes()[0].pose().rotation;
    assert!(rot.abs_diff_eq(Quat::from_rotation_z(0.02), 1e-5));
}

#[test]
fn long_pauses_are_clamped() {
    let backend = RecordingBackend::new(800, 600);
    let (mut session, _) = four_scene_session(
        backend,
        SessionConfig {
            time_scale: 1.0,
            ..SessionConfig::default()
        },
    );
    let t0 = Instant::now();
    session.start_at(t0).unwrap();
    session.frame_at(t0 + Duration::from_secs(30));
    let rot = session.scenes()[0].pose().rotation;
    assert!(rot.abs_diff_eq(Quat::from_rotation_z(0.25), 1e-5));
}

#[test]
fn frame_clock_reports_unscaled_elapsed_time() {
    let t0 = Instant::now();
    let mut clock = FrameClock::starting_at(t0);
    let a = clock.tick_at(t0 + Duration::from_millis(100));
    assert!((a.dt - 0.1).abs() < 1e-6);
    let b = clock.tick_at(t0 + Duration::from_secs(2));
    assert!((b.dt - 0.25).abs() < 1e-6);
    assert!((b.elapsed - 2.0).abs() < 1e-6);
    // a reading from the past never runs the clock backwards
    let c = clock.tick_at(t0);
    assert_eq!(c.dt, 0.0);
    assert!((c.elapsed - 2.0).abs() < 1e-6);
}

#[test]
fn identical_sessions_produce_identical_frames() {
    let run = || {
        let backend = RecordingBackend::new(800, 600);
        let (mut session, _) = four_scene_session(backend.clone(), SessionConfig::default());
        let t0 = Instant::now();
        session.start_at(t0).unwrap();
        for i in 1..=20 {
            session.frame_at(t0 + Duration::from_millis(17 * i));
        }
        let poses: Vec<BallPose> = session.scenes().iter().map(|s| *s.pose()).collect();
        (poses, backend.take_calls())
    };
    let (poses_a, calls_a) = run();
    let (poses_b, calls_b) = run();
    assert_eq!(poses_a, poses_b);
    assert_eq!(calls_a, calls_b);
}

#[test]
fn surface_resize_reaches_the_backend() {
    let (mut session, _) =
        four_scene_session(RecordingBackend::new(800, 600), SessionConfig::default());
    session.start().unwrap();
    session.resize_surface(SurfaceSize {
        width: 1600,
        height: 1200,
    });
    assert_eq!(
        session.backend().surface_size(),
        SurfaceSize {
            width: 1600,
            height: 1200
        }
    );
}

#[test]
fn pixel_ratio_is_capped() {
    let backend = RecordingBackend::new(1600, 1200);
    let dense_surface = FakeLayout::new(ElementRect::from_size(0.0, 0.0, 800.0, 600.0)).with_dpr(3.0);
    let layout = FakeLayout::new(ElementRect::from_size(0.0, 0.0, 800.0, 600.0)).with_dpr(3.0);
    let scene = ready_scene(0, small_config("only", AnimationPolicy::Still), layout);
    let mut session =
        CompositeRenderer::new(backend.clone(), dense_surface, vec![scene], SessionConfig::default());
    let t0 = Instant::now();
    session.start_at(t0).unwrap();
    backend.take_calls();
    session.frame_at(t0 + Duration::from_millis(16));
    assert!(backend
        .take_calls()
        .contains(&Call::Viewport(ViewportRect::new(0, 0, 1600, 1200))));
}
