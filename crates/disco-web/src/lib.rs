#![cfg(target_arch = "wasm32")]
use disco_core::{preset_by_name, CompositeRenderer, ElementRect, LayoutProvider, DEFAULT_PRESET};
use disco_gpu::GpuBackend;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod assets;
mod dom;
mod events;
mod frame;

use dom::ElementLayout;

pub(crate) type Session = CompositeRenderer<GpuBackend<'static>, ElementLayout>;
pub(crate) type SharedSession = Rc<RefCell<Session>>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("disco-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let container = document
        .get_element_by_id(dom::CONTAINER_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", dom::CONTAINER_ID))?;
    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(dom::CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", dom::CANVAS_ID))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    let name = dom::selected_preset(&container);
    let preset = preset_by_name(&name).unwrap_or_else(|| {
        log::warn!("[scene] unknown preset {name:?}, using {DEFAULT_PRESET}");
        disco_core::classic()
    });
    log::info!("[scene] preset {} with {} scenes", preset.name, preset.scene_count());

    // Nothing is built until every asset has settled
    let assets = assets::load_assets(&preset, &dom::matcap_url(&container)).await?;
    for failure in &assets.failures {
        log::warn!("[assets] placeholder in use: {failure}");
    }

    let names: Vec<&str> = preset.scenes.iter().map(|s| s.name.as_str()).collect();
    let blocks = dom::create_overlay_blocks(&document, &container, &names)?;
    let layouts = blocks
        .iter()
        .map(|b| ElementLayout::new(b.clone().into()))
        .collect::<Vec<_>>();

    let size = dom::sync_canvas_backing_size(&canvas);
    let backend = GpuBackend::new(
        wgpu::SurfaceTarget::Canvas(canvas.clone()),
        size,
        &assets.matcap,
        preset.session.clear_color,
    )
    .await?;
    let surface = ElementLayout::new(canvas.clone().into());
    log_layout(&surface);

    let session = preset
        .into_session(backend, surface, layouts, &assets)
        .map_err(|e| anyhow::anyhow!("session start failed: {e}"))?;
    let session: SharedSession = Rc::new(RefCell::new(session));

    for (slot, block) in blocks.iter().enumerate() {
        events::wire_scene_gestures(&session, slot, block);
    }
    events::wire_resize(&session, &canvas);
    frame::start_loop(session, canvas);
    Ok(())
}

fn log_layout(surface: &impl LayoutProvider) {
    let ElementRect {
        left,
        top,
        right,
        bottom,
    } = surface.bounding_rect();
    log::info!(
        "[scene] surface box ({left:.0},{top:.0})-({right:.0},{bottom:.0}) dpr {:.2}",
        surface.pixel_ratio()
    );
}
