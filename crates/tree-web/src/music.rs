//! Looping background track: starts on the first click anywhere, then the
//! toggle button pauses and resumes it.

use crate::dom;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

const VOLUME: f64 = 0.3;
const TOGGLE_ID: &str = "music-toggle";

async fn play(audio: web::HtmlAudioElement) {
    match audio.play() {
        Ok(promise) => {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("[music] play rejected: {:?}", e);
            }
        }
        Err(e) => log::warn!("[music] play failed: {:?}", e),
    }
}

pub fn install(document: &web::Document, url: Option<&str>) {
    let Some(url) = url else {
        dom::set_visible(document, TOGGLE_ID, false);
        return;
    };
    let audio = match web::HtmlAudioElement::new_with_src(url) {
        Ok(a) => a,
        Err(e) => {
            log::error!("[music] audio element error: {:?}", e);
            return;
        }
    };
    audio.set_loop(true);
    audio.set_volume(VOLUME);
    let started = Rc::new(Cell::new(false));

    // first click anywhere starts playback; browsers block autoplay before that
    {
        let audio = audio.clone();
        let started = started.clone();
        let closure = Closure::wrap(Box::new(move || {
            if started.replace(true) {
                return;
            }
            log::info!("[music] starting");
            spawn_local(play(audio.clone()));
        }) as Box<dyn FnMut()>);
        let _ = document.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    let doc = document.clone();
    dom::add_click_listener(document, TOGGLE_ID, move || {
        // the document listener above also sees this click and handles the first start
        if !started.get() {
            return;
        }
        if audio.paused() {
            spawn_local(play(audio.clone()));
            dom::set_text(&doc, TOGGLE_ID, "Music ON");
        } else {
            let _ = audio.pause();
            dom::set_text(&doc, TOGGLE_ID, "Music OFF");
        }
    });
}
