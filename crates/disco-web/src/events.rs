//! Orbit and zoom gestures on each scene's overlay block, plus the window
//! resize listener.

use crate::dom;
use crate::SharedSession;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

fn listen<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
    target: &web::EventTarget,
    name: &str,
    handler: impl FnMut(E) + 'static,
) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    let _ = target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
    closure.forget();
}

pub fn wire_scene_gestures(session: &SharedSession, slot: usize, block: &web::HtmlElement) {
    let last = Rc::new(Cell::new(None::<(f32, f32)>));

    // pointerdown
    {
        let session = session.clone();
        let last = last.clone();
        let target = block.clone();
        listen(block, "pointerdown", move |ev: web::PointerEvent| {
            if let Some(scene) = session.borrow_mut().scene_mut(slot) {
                scene.controls_mut().begin_drag();
            }
            last.set(Some((ev.client_x() as f32, ev.client_y() as f32)));
            let _ = target.set_pointer_capture(ev.pointer_id());
            ev.prevent_default();
        });
    }

    // pointermove
    {
        let session = session.clone();
        let last = last.clone();
        listen(block, "pointermove", move |ev: web::PointerEvent| {
            let Some((x0, y0)) = last.get() else {
                return;
            };
            let (x, y) = (ev.client_x() as f32, ev.client_y() as f32);
            last.set(Some((x, y)));
            if let Some(scene) = session.borrow_mut().scene_mut(slot) {
                scene.orbit_drag(x - x0, y - y0);
            }
        });
    }

    // pointerup / pointercancel
    for name in ["pointerup", "pointercancel"] {
        let session = session.clone();
        let last = last.clone();
        let target = block.clone();
        listen(block, name, move |ev: web::PointerEvent| {
            last.set(None);
            if let Some(scene) = session.borrow_mut().scene_mut(slot) {
                scene.controls_mut().end_drag();
            }
            let _ = target.release_pointer_capture(ev.pointer_id());
        });
    }

    // wheel, non-passive so the page does not scroll while zooming
    {
        let session = session.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::WheelEvent| {
            let mut s = session.borrow_mut();
            let Some(scene) = s.scene_mut(slot) else {
                return;
            };
            if scene.config().controls.enable_zoom {
                scene.zoom(ev.delta_y() as f32);
                ev.prevent_default();
            }
        }) as Box<dyn FnMut(web::WheelEvent)>);
        let opts = web::AddEventListenerOptions::new();
        opts.set_passive(false);
        let _ = block.add_event_listener_with_callback_and_add_event_listener_options(
            "wheel",
            closure.as_ref().unchecked_ref(),
            &opts,
        );
        closure.forget();
    }
}

pub fn wire_resize(session: &SharedSession, canvas: &web::HtmlCanvasElement) {
    let Some(window) = web::window() else {
        return;
    };
    let session = session.clone();
    let canvas = canvas.clone();
    let closure = Closure::wrap(Box::new(move || {
        let size = dom::sync_canvas_backing_size(&canvas);
        session.borrow_mut().resize_surface(size);
    }) as Box<dyn FnMut()>);
    window
        .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
        .ok();
    closure.forget();
}
