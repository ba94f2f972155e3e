//! Browser front-end: WebGPU canvas, camera gestures, wishes and music.
//!
//! The plain helpers (`config`, `bridge`, `remote`, `startup`) build on any
//! target so they can be unit tested natively; everything touching the DOM is
//! wasm-only.

pub mod bridge;
pub mod config;
pub mod remote;
pub mod startup;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod frame;
#[cfg(target_arch = "wasm32")]
mod gesture;
#[cfg(target_arch = "wasm32")]
mod music;
#[cfg(target_arch = "wasm32")]
mod overlay;
#[cfg(target_arch = "wasm32")]
mod photos;
#[cfg(target_arch = "wasm32")]
mod wishes;

#[cfg(target_arch = "wasm32")]
pub use app::start;

#[cfg(target_arch = "wasm32")]
mod app {
    use crate::config::{Quality, WebConfig};
    use crate::frame::{self, FrameContext};
    use crate::wishes::NameTags;
    use crate::{dom, gesture, music, overlay, photos, wishes};
    use instant::Instant;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tree_core::{Scene, SceneConfig, SceneStore};
    use tree_render::Renderer;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::spawn_local;
    use web_sys as web;

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();
        log::info!("tree-web starting");

        spawn_local(async move {
            if let Err(e) = init().await {
                log::error!("init error: {:?}", e);
                dom::alert(&format!("Could not start: {e}"));
            }
        });
        Ok(())
    }

    async fn init() -> anyhow::Result<()> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| anyhow::anyhow!("no document"))?;
        let canvas: web::HtmlCanvasElement = document
            .get_element_by_id("app-canvas")
            .ok_or_else(|| anyhow::anyhow!("missing #app-canvas"))?
            .dyn_into::<web::HtmlCanvasElement>()
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
        let web_config = WebConfig::from_attrs(|name| canvas.get_attribute(&format!("data-{name}")));
        dom::sync_canvas_backing_size(&canvas);

        let cores = window.navigator().hardware_concurrency();
        let quality = Quality::pick(web_config.quality, cores);
        log::info!("[config] {quality:?} quality ({cores} cores reported)");

        let scene_config = quality.scene_config(SceneConfig::default());
        let bindings = scene_config.bindings.clone();
        let mut scene = Scene::new(scene_config)?;
        let (width, height) = (canvas.width(), canvas.height());
        scene.set_aspect(width as f32 / height.max(1) as f32);

        let store = Rc::new(RefCell::new(SceneStore::new()));
        overlay::bind(&document, &mut store.borrow_mut());

        let mut renderer =
            Renderer::new(wgpu::SurfaceTarget::Canvas(canvas.clone()), width, height).await?;
        let (strength, threshold) = quality.bloom();
        renderer.set_bloom(strength, threshold);
        let renderer = Rc::new(RefCell::new(renderer));
        let scene = Rc::new(RefCell::new(scene));
        overlay::hide_loading(&document);

        photos::load_all(web_config.photo_urls.clone(), renderer.clone());
        music::install(&document, web_config.music_url.as_deref());
        gesture::GestureControl::new(store.clone(), web_config.recognizer.clone(), bindings)
            .install(&document);
        wishes::install(&document, scene.clone(), web_config.wishes.clone());

        let ctx = FrameContext {
            store,
            scene,
            renderer,
            tags: NameTags::new(&document),
            document,
            canvas,
            last_instant: Instant::now(),
        };
        frame::start_loop(Rc::new(RefCell::new(ctx)));
        Ok(())
    }
}
