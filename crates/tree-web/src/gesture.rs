//! Camera capture and the throttled recognizer loop.
//!
//! Enabling gesture mode acquires the camera, loads the recognizer once and
//! starts a requestAnimationFrame loop that feeds readings through the
//! bindings into the store. Disabling drops the [`GestureSession`], which
//! cancels the loop and stops every media track.

use crate::bridge;
use crate::config::RecognizerAssets;
use crate::dom;
use crate::overlay::CAMERA_BUTTON_ID;
use crate::startup::{StartGate, StartTicket};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tree_core::{GestureBindings, InferenceThrottle, SceneStore};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

const VIDEO_ID: &str = "gesture-video";
const HAVE_ENOUGH_DATA: u16 = 4;

#[wasm_bindgen(module = "/js/gesture_bridge.js")]
extern "C" {
    #[wasm_bindgen(js_name = loadRecognizer)]
    fn load_recognizer(wasm_base: &str, model_url: &str) -> js_sys::Promise;

    #[wasm_bindgen(catch)]
    fn recognize(video: &web::HtmlVideoElement, now_ms: f64) -> Result<Option<String>, JsValue>;
}

/// Owns a live camera stream; dropping it stops every track.
pub struct CameraStream {
    stream: web::MediaStream,
}

impl CameraStream {
    async fn open() -> anyhow::Result<Self> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let devices = window
            .navigator()
            .media_devices()
            .map_err(|e| anyhow::anyhow!("camera unavailable (HTTPS or localhost required): {:?}", e))?;
        let constraints = web::MediaStreamConstraints::new();
        let video = js_sys::Object::new();
        js_sys::Reflect::set(&video, &"facingMode".into(), &"user".into())
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        js_sys::Reflect::set(&video, &"width".into(), &640.into())
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        js_sys::Reflect::set(&video, &"height".into(), &480.into())
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        constraints.set_video(&video);
        constraints.set_audio(&JsValue::FALSE);
        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(|e| anyhow::anyhow!("getUserMedia error: {:?}", e))?;
        let stream = JsFuture::from(promise)
            .await
            .map_err(|e| anyhow::anyhow!("camera permission denied: {:?}", e))?
            .dyn_into::<web::MediaStream>()
            .map_err(|e| anyhow::anyhow!("not a MediaStream: {:?}", e))?;
        log::info!("[gesture] camera stream acquired");
        Ok(Self { stream })
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        for track in self.stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<web::MediaStreamTrack>() {
                track.stop();
            }
        }
        log::info!("[gesture] camera stream released");
    }
}

type Tick = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// A running capture: stream, video element and inference loop.
pub struct GestureSession {
    _stream: CameraStream,
    video: web::HtmlVideoElement,
    tick: Tick,
    raf_id: Rc<Cell<Option<i32>>>,
}

impl Drop for GestureSession {
    fn drop(&mut self) {
        if let (Some(w), Some(id)) = (web::window(), self.raf_id.take()) {
            let _ = w.cancel_animation_frame(id);
        }
        // breaks the closure's reference to itself
        self.tick.borrow_mut().take();
        self.video.set_src_object(None);
    }
}

fn request_frame(tick: &Tick, raf_id: &Cell<Option<i32>>) {
    let Some(w) = web::window() else { return };
    if let Some(cb) = tick.borrow().as_ref() {
        raf_id.set(w.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
    }
}

impl GestureSession {
    async fn start(
        assets: &RecognizerAssets,
        store: Rc<RefCell<SceneStore>>,
        bindings: GestureBindings,
    ) -> anyhow::Result<Self> {
        let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
        let video: web::HtmlVideoElement = dom::typed(&document, VIDEO_ID)
            .ok_or_else(|| anyhow::anyhow!("missing #{VIDEO_ID}"))?;

        let stream = CameraStream::open().await?;
        video.set_src_object(Some(&stream.stream));
        let playing = video
            .play()
            .map_err(|e| anyhow::anyhow!("video play error: {:?}", e))?;
        JsFuture::from(playing)
            .await
            .map_err(|e| anyhow::anyhow!("video play rejected: {:?}", e))?;

        JsFuture::from(load_recognizer(&assets.wasm_base, &assets.model_url))
            .await
            .map_err(|e| anyhow::anyhow!("gesture model failed to load: {:?}", e))?;
        log::info!("[gesture] recognizer ready");

        let tick: Tick = Rc::new(RefCell::new(None));
        let raf_id = Rc::new(Cell::new(None));
        let mut throttle = InferenceThrottle::default();
        {
            let tick_inner = tick.clone();
            let raf_inner = raf_id.clone();
            let video = video.clone();
            *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                let now = dom::monotonic_ms();
                if video.ready_state() == HAVE_ENOUGH_DATA && throttle.ready(now) {
                    match recognize(&video, now) {
                        Ok(Some(json)) => match bridge::parse_reading(&json) {
                            Ok(Some(reading)) => {
                                if let Some(action) = bindings.apply(&reading, &mut store.borrow_mut()) {
                                    log::debug!("[gesture] {:?} -> {:?}", reading.top(), action);
                                }
                            }
                            Ok(None) => {}
                            Err(e) => log::warn!("[gesture] bad reading: {e}"),
                        },
                        Ok(None) => {}
                        // previous gesture state stays in place
                        Err(e) => log::warn!("[gesture] recognition error: {:?}", e),
                    }
                }
                request_frame(&tick_inner, &raf_inner);
            }) as Box<dyn FnMut()>));
        }
        request_frame(&tick, &raf_id);

        Ok(Self {
            _stream: stream,
            video,
            tick,
            raf_id,
        })
    }
}

/// Camera button wiring plus the currently running session, if any.
pub struct GestureControl {
    store: Rc<RefCell<SceneStore>>,
    assets: RecognizerAssets,
    bindings: GestureBindings,
    session: RefCell<Option<GestureSession>>,
    starts: StartGate,
}

impl GestureControl {
    pub fn new(
        store: Rc<RefCell<SceneStore>>,
        assets: RecognizerAssets,
        bindings: GestureBindings,
    ) -> Rc<Self> {
        Rc::new(Self {
            store,
            assets,
            bindings,
            session: RefCell::new(None),
            starts: StartGate::default(),
        })
    }

    pub fn install(self: &Rc<Self>, document: &web::Document) {
        let this = self.clone();
        dom::add_click_listener(document, CAMERA_BUTTON_ID, move || {
            let enable = !this.store.borrow().get().camera_enabled;
            this.set_enabled(enable);
        });
    }

    pub fn set_enabled(self: &Rc<Self>, enabled: bool) {
        // every toggle supersedes a start-up still in flight
        let ticket = self.starts.begin();
        self.store.borrow_mut().set_camera_enabled(enabled);
        if !enabled {
            self.session.borrow_mut().take();
            return;
        }
        let this = self.clone();
        spawn_local(async move {
            let result =
                GestureSession::start(&this.assets, this.store.clone(), this.bindings.clone()).await;
            this.finish_start(ticket, result);
        });
    }

    fn finish_start(&self, ticket: StartTicket, result: anyhow::Result<GestureSession>) {
        if !self.starts.is_current(ticket) {
            match result {
                Ok(_) => log::info!("[gesture] superseded start-up discarded"),
                Err(e) => log::info!("[gesture] superseded start-up failed: {e}"),
            }
            return;
        }
        match result {
            Ok(session) => *self.session.borrow_mut() = Some(session),
            Err(e) => {
                log::error!("[gesture] start failed: {e:?}");
                dom::alert(&format!("Gesture control unavailable: {e}"));
                self.store.borrow_mut().set_camera_enabled(false);
            }
        }
    }
}
