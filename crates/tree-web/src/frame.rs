use crate::dom;
use crate::wishes::NameTags;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use tree_core::{Scene, SceneStore};
use tree_render::Renderer;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub store: Rc<RefCell<SceneStore>>,
    pub scene: Rc<RefCell<Scene>>,
    pub renderer: Rc<RefCell<Renderer<'static>>>,
    pub document: web::Document,
    pub canvas: web::HtmlCanvasElement,
    pub tags: NameTags,
    pub last_instant: Instant,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f32();
        self.last_instant = now;

        let state = self.store.borrow().get();
        let mut scene = self.scene.borrow_mut();
        let mut renderer = self.renderer.borrow_mut();

        let (w, h) = (self.canvas.width(), self.canvas.height());
        if (w, h) != renderer.size() {
            renderer.resize(w, h);
        }
        scene.set_aspect(w as f32 / h.max(1) as f32);

        scene.tick(&state, dt_sec);
        scene.emit(&mut *renderer);
        renderer.set_camera(scene.camera());
        match renderer.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::Timeout) => log::warn!("[render] surface timeout"),
            Err(e) => log::error!("[render] {e:?}"),
        }
        self.tags.sync(&self.document, &scene);
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
    // keep the canvas backing store in device pixels; the loop picks up the change
    if let Some(w) = web::window() {
        let canvas = frame_ctx.borrow().canvas.clone();
        let closure = Closure::wrap(Box::new(move || dom::sync_canvas_backing_size(&canvas))
            as Box<dyn FnMut()>);
        let _ = w.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}
