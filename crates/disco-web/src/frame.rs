use crate::dom;
use crate::SharedSession;
use disco_core::RenderBackend;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// One animation frame: keep the backing store in step with the canvas box,
/// then let the compositor draw every scene.
fn frame(session: &SharedSession, canvas: &web::HtmlCanvasElement) {
    let mut s = session.borrow_mut();
    let size = dom::sync_canvas_backing_size(canvas);
    if size != s.backend().surface_size() {
        s.resize_surface(size);
    }
    let report = s.frame();
    if !report.failed.is_empty() {
        log::debug!("[frame] failed scenes {:?}", report.failed);
    }
}

pub fn start_loop(session: SharedSession, canvas: web::HtmlCanvasElement) {
    let tick: std::rc::Rc<std::cell::RefCell<Option<Closure<dyn FnMut()>>>> =
        std::rc::Rc::new(std::cell::RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame(&session, &canvas);
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
