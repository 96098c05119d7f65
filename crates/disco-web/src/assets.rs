//! Browser-side asset loading, joined into an `AssetGate` before any scene
//! is built.

use disco_core::{fallback_primitive, AssetError, AssetKey, MatcapImage, Preset, ResolvedAssets};
use futures::channel::oneshot;
use futures::future::{join, join_all};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

fn load_failed(reason: impl Into<String>) -> AssetError {
    AssetError::LoadFailed {
        key: AssetKey::Matcap,
        reason: reason.into(),
    }
}

async fn fetch_image(url: &str) -> Result<web::HtmlImageElement, AssetError> {
    let img = web::HtmlImageElement::new().map_err(|e| load_failed(format!("{:?}", e)))?;
    img.set_cross_origin(Some("anonymous"));

    let (tx, rx) = oneshot::channel::<Result<(), String>>();
    let tx = Rc::new(RefCell::new(Some(tx)));
    let tx_err = tx.clone();
    let onload: Closure<dyn FnMut()> = Closure::once(move || {
        if let Some(tx) = tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });
    let url_owned = url.to_string();
    let onerror: Closure<dyn FnMut()> = Closure::once(move || {
        if let Some(tx) = tx_err.borrow_mut().take() {
            let _ = tx.send(Err(format!("could not load {url_owned}")));
        }
    });
    img.set_onload(Some(onload.as_ref().unchecked_ref()));
    img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    img.set_src(url);

    let outcome = rx.await.map_err(|_| load_failed("image loader dropped"))?;
    img.set_onload(None);
    img.set_onerror(None);
    outcome.map_err(load_failed)?;
    Ok(img)
}

/// Decode through an offscreen 2D canvas. The WebGPU canvas never gets a 2D
/// context.
fn image_pixels(img: &web::HtmlImageElement) -> Result<MatcapImage, AssetError> {
    let (w, h) = (img.natural_width(), img.natural_height());
    let document = crate::dom::window_document().ok_or_else(|| load_failed("no document"))?;
    let scratch = document
        .create_element("canvas")
        .map_err(|e| load_failed(format!("{:?}", e)))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| load_failed(format!("{:?}", e)))?;
    scratch.set_width(w);
    scratch.set_height(h);
    let ctx = scratch
        .get_context("2d")
        .map_err(|e| load_failed(format!("{:?}", e)))?
        .ok_or_else(|| load_failed("no 2d context"))?
        .dyn_into::<web::CanvasRenderingContext2d>()
        .map_err(|e| load_failed(format!("{:?}", e)))?;
    ctx.draw_image_with_html_image_element(img, 0.0, 0.0)
        .map_err(|e| load_failed(format!("{:?}", e)))?;
    let data = ctx
        .get_image_data(0.0, 0.0, w as f64, h as f64)
        .map_err(|e| load_failed(format!("{:?}", e)))?;
    MatcapImage::from_rgba(w, h, data.data().0)
}

pub async fn load_matcap(url: &str) -> Result<MatcapImage, AssetError> {
    let img = fetch_image(url).await?;
    image_pixels(&img)
}

/// Load the matcap and every scene geometry concurrently and wait for all of
/// them to settle.
pub async fn load_assets(preset: &Preset, matcap_url: &str) -> anyhow::Result<ResolvedAssets> {
    let mut gate = preset.asset_gate();
    let geometry_loads = preset
        .scenes
        .iter()
        .map(|scene| async move { scene.geometry.load() });
    let (matcap, geometries) = join(load_matcap(matcap_url), join_all(geometry_loads)).await;

    gate.resolve_matcap(matcap)?;
    for (i, g) in geometries.into_iter().enumerate() {
        gate.resolve_geometry(i, g)?;
    }
    gate.resolve(&fallback_primitive())
        .ok_or_else(|| anyhow::anyhow!("assets still pending: {:?}", gate.pending()))
}
