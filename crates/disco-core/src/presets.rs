//! Named scene line-ups.
//!
//! A preset is the full list of [`SceneConfig`]s for one page plus its
//! session settings. Front-ends pick one by name, load its assets through an
//! [`AssetGate`] and hand the resolved bundle to [`Preset::into_session`].

use crate::animation::{AnimationPolicy, SpinAxis};
use crate::assets::{AssetGate, ResolvedAssets};
use crate::ball::{AttachmentSpec, DiscoBall};
use crate::camera::CameraFraming;
use crate::compositor::{CompositeRenderer, RenderBackend, SessionConfig, SessionError};
use crate::constants::MASCOT_INNER_COLOR_RGB;
use crate::controls::ControlsConfig;
use crate::geometry::RawSurface;
use crate::primitives::{GeometrySource, Primitive};
use crate::scene::{SceneConfig, ViewportScene};
use crate::viewport::LayoutProvider;
use glam::Vec3;
use std::f32::consts::PI;

pub const PRESET_NAMES: [&str; 3] = ["classic", "numbers", "mascot"];
pub const DEFAULT_PRESET: &str = "classic";

#[derive(Clone, Debug, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub session: SessionConfig,
    pub scenes: Vec<SceneConfig>,
}

/// Geometry substituted for a ball whose source failed to load.
pub fn fallback_primitive() -> Primitive {
    Primitive::Icosahedron {
        radius: 0.5,
        detail: 3,
    }
}

pub fn preset_by_name(name: &str) -> Option<Preset> {
    match name.trim().to_ascii_lowercase().as_str() {
        "classic" => Some(classic()),
        "numbers" => Some(numbers()),
        "mascot" => Some(mascot()),
        _ => None,
    }
}

impl Preset {
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// An empty gate with one geometry slot per scene.
    pub fn asset_gate(&self) -> AssetGate {
        AssetGate::new(self.scenes.len())
    }

    /// Build one scene per layout, in slot order. Missing geometries or
    /// failed builds fall back to the placeholder ball so one bad scene never
    /// blocks the rest.
    pub fn assemble<L: LayoutProvider>(
        &self,
        geometries: &[RawSurface],
        layouts: Vec<L>,
    ) -> Vec<ViewportScene<L>> {
        if layouts.len() != self.scenes.len() {
            log::warn!(
                "[scene] preset {} has {} scenes but {} layout blocks",
                self.name,
                self.scenes.len(),
                layouts.len()
            );
        }
        self.scenes
            .iter()
            .zip(layouts)
            .enumerate()
            .map(|(slot, (config, layout))| {
                let mut scene = ViewportScene::new(slot, config.clone(), layout);
                scene.attach_ball(self.ball_for(slot, config, geometries.get(slot)));
                scene
            })
            .collect()
    }

    fn ball_for(&self, slot: usize, config: &SceneConfig, raw: Option<&RawSurface>) -> DiscoBall {
        let built = match raw {
            Some(raw) => config.build_ball(raw),
            None => config.geometry.load().and_then(|raw| config.build_ball(&raw)),
        };
        match built {
            Ok(ball) => ball,
            Err(e) => {
                log::warn!("[scene] {slot} ({}) using placeholder ball: {e}", config.name);
                let raw = fallback_primitive().build().unwrap_or_default();
                DiscoBall::from_raw(&raw, config.tile_size)
            }
        }
    }

    /// Assemble the scenes from `assets` and start rendering them.
    pub fn into_session<B: RenderBackend, L: LayoutProvider>(
        self,
        backend: B,
        surface: L,
        layouts: Vec<L>,
        assets: &ResolvedAssets,
    ) -> Result<CompositeRenderer<B, L>, SessionError> {
        let scenes = self.assemble(&assets.geometries, layouts);
        let mut renderer = CompositeRenderer::new(backend, surface, scenes, self.session);
        renderer.start()?;
        Ok(renderer)
    }
}

fn classic_controls(auto_rotate_speed: f32) -> ControlsConfig {
    ControlsConfig {
        min_distance: 2.0,
        max_distance: 5.0,
        auto_rotate: true,
        auto_rotate_speed,
        enable_zoom: false,
        enable_damping: true,
        ..ControlsConfig::default()
    }
}

/// Knot, sphere and torus side by side.
pub fn classic() -> Preset {
    let mut knot = SceneConfig::new(
        "knot",
        GeometrySource::new(Primitive::TorusKnot {
            radius: 0.25,
            tube: 0.2,
            tubular_segments: 64,
            radial_segments: 12,
            p: 2,
            q: 3,
        }),
        0.08,
    );
    knot.animation = AnimationPolicy::Tumble { rate: 1.0 };
    knot.controls = classic_controls(6.0);

    let mut sphere = SceneConfig::new(
        "sphere",
        GeometrySource::new(Primitive::Icosahedron {
            radius: 0.8,
            detail: 5,
        }),
        0.11,
    );
    sphere.controls = classic_controls(4.0);

    let mut torus = SceneConfig::new(
        "torus",
        GeometrySource::new(Primitive::Torus {
            radius: 0.35,
            tube: 0.2,
            radial_segments: 12,
            tubular_segments: 24,
        })
        .rotated_x(-0.4),
        0.08,
    );
    torus.animation = AnimationPolicy::spin(SpinAxis::Z, -3.0);
    torus.controls = classic_controls(6.0);

    Preset {
        name: "classic",
        session: SessionConfig::default(),
        scenes: vec![knot, sphere, torus],
    }
}

/// Four small shapes in a narrow field of view, each spinning about its own
/// axis.
pub fn numbers() -> Preset {
    let shapes = [
        (
            "zero",
            Primitive::Torus {
                radius: 0.12,
                tube: 0.035,
                radial_segments: 16,
                tubular_segments: 48,
            },
            SpinAxis::Z,
            16.0,
        ),
        (
            "one",
            Primitive::TorusKnot {
                radius: 0.09,
                tube: 0.03,
                tubular_segments: 96,
                radial_segments: 12,
                p: 2,
                q: 3,
            },
            SpinAxis::Y,
            -10.0,
        ),
        (
            "two",
            Primitive::Icosahedron {
                radius: 0.14,
                detail: 6,
            },
            SpinAxis::X,
            -14.0,
        ),
        (
            "three",
            Primitive::TorusKnot {
                radius: 0.1,
                tube: 0.03,
                tubular_segments: 96,
                radial_segments: 12,
                p: 3,
                q: 2,
            },
            SpinAxis::Y,
            12.0,
        ),
    ];
    let scenes = shapes
        .into_iter()
        .map(|(name, shape, axis, rate)| {
            let mut cfg = SceneConfig::new(name, GeometrySource::new(shape), 0.008);
            cfg.animation = AnimationPolicy::Spin {
                axis,
                rate,
                bob: None,
            };
            cfg.framing.fov_degrees = 12.0;
            cfg.controls = ControlsConfig {
                auto_rotate: false,
                ..classic_controls(6.0)
            };
            cfg
        })
        .collect();
    Preset {
        name: "numbers",
        session: SessionConfig {
            time_scale: 0.08,
            ..SessionConfig::default()
        },
        scenes,
    }
}

/// One character with eyes and a nose, viewed from behind its yaw so it
/// faces the camera.
pub fn mascot() -> Preset {
    let mut cfg = SceneConfig::new(
        "mascot",
        GeometrySource::new(Primitive::Icosahedron {
            radius: 0.036,
            detail: 20,
        })
        .translated(Vec3::new(0.0, 0.07, 0.0)),
        0.0012,
    );
    cfg.inner_color = MASCOT_INNER_COLOR_RGB;
    cfg.attachments.push(AttachmentSpec::sphere(0.0042, Vec3::new(-0.01, 0.087, 0.026)));
    cfg.attachments.push(AttachmentSpec::sphere(0.0042, Vec3::new(0.013, 0.084, 0.028)));
    cfg.attachments
        .push(AttachmentSpec::sphere(0.0045, Vec3::new(0.001, 0.078, 0.04)).with_scale(1.4));
    cfg.animation = AnimationPolicy::showcase(PI);
    cfg.framing = CameraFraming {
        fov_degrees: 22.0,
        scene_origin: Vec3::new(0.0, -0.25, 0.0),
        eye_offset: Vec3::new(0.0, 0.1, -1.5),
        vertical_extent: 2.0,
        ..CameraFraming::default()
    };
    cfg.controls = ControlsConfig {
        min_distance: 1.25,
        max_distance: 10.0,
        auto_rotate: true,
        auto_rotate_speed: 3.0,
        enable_zoom: true,
        enable_rotate: true,
        enable_damping: true,
        ..ControlsConfig::default()
    };
    Preset {
        name: "mascot",
        session: SessionConfig::default(),
        scenes: vec![cfg],
    }
}
