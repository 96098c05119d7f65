use clap::Parser;
use disco_core::{
    fallback_primitive, preset_by_name, AssetError, AssetKey, MatcapImage, Preset, ResolvedAssets,
    SurfaceSize, DEFAULT_PRESET, PRESET_NAMES,
};
use disco_gpu::GpuBackend;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use winit::{event::*, event_loop::EventLoop, window::WindowBuilder};

mod layout;

use layout::{WindowLayout, WindowMetrics};

#[derive(Parser, Debug)]
#[command(name = "mirrorball", version, about = "Disco balls, one window")]
struct Args {
    /// Scene line-up: classic, numbers or mascot
    #[arg(long, default_value = DEFAULT_PRESET)]
    preset: String,

    /// PNG matcap; the built-in studio matcap is used when absent
    #[arg(long)]
    matcap: Option<PathBuf>,
}

fn load_matcap(path: &Path) -> Result<MatcapImage, AssetError> {
    let img = image::open(path)
        .map_err(|e| AssetError::LoadFailed {
            key: AssetKey::Matcap,
            reason: format!("{}: {e}", path.display()),
        })?
        .to_rgba8();
    let (w, h) = img.dimensions();
    MatcapImage::from_rgba(w, h, img.into_raw())
}

fn load_assets(preset: &Preset, matcap: Option<&Path>) -> anyhow::Result<ResolvedAssets> {
    let mut gate = preset.asset_gate();
    gate.resolve_matcap(match matcap {
        Some(path) => load_matcap(path),
        None => Ok(MatcapImage::procedural_default()),
    })?;
    for (i, scene) in preset.scenes.iter().enumerate() {
        gate.resolve_geometry(i, scene.geometry.load())?;
    }
    gate.resolve(&fallback_primitive())
        .ok_or_else(|| anyhow::anyhow!("assets still pending: {:?}", gate.pending()))
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let preset = preset_by_name(&args.preset).ok_or_else(|| {
        anyhow::anyhow!("unknown preset {:?}, expected one of {:?}", args.preset, PRESET_NAMES)
    })?;
    let assets = load_assets(&preset, args.matcap.as_deref())?;
    for failure in &assets.failures {
        log::warn!("[assets] placeholder in use: {failure}");
    }

    let event_loop = EventLoop::new().expect("event loop");
    let window = WindowBuilder::new()
        .with_title(format!("mirrorball ({})", preset.name))
        .with_transparent(true)
        .build(&event_loop)
        .expect("window");

    let size = window.inner_size();
    let scale = window.scale_factor() as f32;
    let metrics = Rc::new(Cell::new(WindowMetrics {
        width: size.width as f32 / scale,
        height: size.height as f32 / scale,
        scale,
    }));

    let backend = pollster::block_on(GpuBackend::new(
        &window,
        SurfaceSize {
            width: size.width,
            height: size.height,
        },
        &assets.matcap,
        preset.session.clear_color,
    ))?;
    let layouts = WindowLayout::cells(&metrics, preset.scene_count());
    let surface = WindowLayout::Surface(metrics.clone());
    let mut session = preset
        .into_session(backend, surface, layouts, &assets)
        .map_err(|e| anyhow::anyhow!("session start failed: {e}"))?;

    let window = &window;
    let mut cursor: Option<(f32, f32)> = None;
    let mut drag_slot: Option<usize> = None;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::Resized(size) => {
                let scale = metrics.get().scale;
                metrics.set(WindowMetrics {
                    width: size.width as f32 / scale,
                    height: size.height as f32 / scale,
                    scale,
                });
                session.resize_surface(SurfaceSize {
                    width: size.width,
                    height: size.height,
                });
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let m = metrics.get();
                metrics.set(WindowMetrics {
                    scale: scale_factor as f32,
                    ..m
                });
            }
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::CursorMoved { position, .. } => {
                let scale = metrics.get().scale;
                let (x, y) = (position.x as f32 / scale, position.y as f32 / scale);
                if let (Some(slot), Some((x0, y0))) = (drag_slot, cursor) {
                    if let Some(scene) = session.scene_mut(slot) {
                        scene.orbit_drag(x - x0, y - y0);
                    }
                }
                cursor = Some((x, y));
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    drag_slot = cursor.and_then(|(x, y)| {
                        session
                            .scenes()
                            .iter()
                            .position(|s| s.layout().contains(x, y))
                    });
                    if let Some(scene) = drag_slot.and_then(|slot| session.scene_mut(slot)) {
                        scene.controls_mut().begin_drag();
                    }
                }
                ElementState::Released => {
                    if let Some(scene) = drag_slot.take().and_then(|slot| session.scene_mut(slot)) {
                        scene.controls_mut().end_drag();
                    }
                }
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y,
                    MouseScrollDelta::PixelDelta(p) => -(p.y as f32),
                };
                let hovered = cursor.and_then(|(x, y)| {
                    session
                        .scenes()
                        .iter()
                        .position(|s| s.layout().contains(x, y))
                });
                if let Some(scene) = hovered.and_then(|slot| session.scene_mut(slot)) {
                    scene.zoom(dy);
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            session.frame();
            window.request_redraw();
        }
        _ => {}
    })?;
    Ok(())
}
