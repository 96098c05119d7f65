use disco_core::{ElementRect, LayoutProvider, SurfaceSize, DEFAULT_PRESET, MAX_PIXEL_RATIO};
use wasm_bindgen::JsCast;
use web_sys as web;

pub const CONTAINER_ID: &str = "mirrorball";
pub const CANVAS_ID: &str = "mirrorball-canvas";
pub const BLOCK_CLASS: &str = "overlay-block";
pub const DEFAULT_MATCAP_URL: &str = "matcap.png";

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn pixel_ratio() -> f32 {
    web::window()
        .map(|w| w.device_pixel_ratio() as f32)
        .unwrap_or(1.0)
        .min(MAX_PIXEL_RATIO)
}

/// Size the canvas backing store to its CSS box times the capped pixel ratio.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> SurfaceSize {
    let dpr = pixel_ratio() as f64;
    let rect = canvas.get_bounding_client_rect();
    let w_px = ((rect.width() * dpr).round() as u32).max(1);
    let h_px = ((rect.height() * dpr).round() as u32).max(1);
    if canvas.width() != w_px {
        canvas.set_width(w_px);
    }
    if canvas.height() != h_px {
        canvas.set_height(h_px);
    }
    SurfaceSize {
        width: w_px,
        height: h_px,
    }
}

/// Live layout box of a DOM element, read on every call.
#[derive(Clone)]
pub struct ElementLayout {
    element: web::Element,
}

impl ElementLayout {
    pub fn new(element: web::Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &web::Element {
        &self.element
    }
}

impl LayoutProvider for ElementLayout {
    fn bounding_rect(&self) -> ElementRect {
        let r = self.element.get_bounding_client_rect();
        ElementRect::new(r.left() as f32, r.top() as f32, r.right() as f32, r.bottom() as f32)
    }

    fn pixel_ratio(&self) -> f32 {
        pixel_ratio()
    }
}

/// `?preset=` wins over the container's `data-preset`.
pub fn selected_preset(container: &web::Element) -> String {
    let from_query = web::window()
        .and_then(|w| w.location().search().ok())
        .and_then(|s| web::UrlSearchParams::new_with_str(&s).ok())
        .and_then(|p| p.get("preset"));
    from_query
        .or_else(|| container.get_attribute("data-preset"))
        .unwrap_or_else(|| DEFAULT_PRESET.to_string())
}

pub fn matcap_url(container: &web::Element) -> String {
    container
        .get_attribute("data-matcap")
        .unwrap_or_else(|| DEFAULT_MATCAP_URL.to_string())
}

/// One empty overlay block per scene, appended to `container` in slot order.
pub fn create_overlay_blocks(
    document: &web::Document,
    container: &web::Element,
    names: &[&str],
) -> anyhow::Result<Vec<web::HtmlElement>> {
    let mut blocks = Vec::with_capacity(names.len());
    for (slot, name) in names.iter().enumerate() {
        let el = document
            .create_element("div")
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
        el.set_class_name(BLOCK_CLASS);
        let _ = el.set_attribute("data-scene", name);
        let _ = el.set_attribute("data-slot", &slot.to_string());
        container
            .append_child(&el)
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
        let block = el
            .dyn_into::<web::HtmlElement>()
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
        blocks.push(block);
    }
    Ok(blocks)
}
