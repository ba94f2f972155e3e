//! Loading overlay, state label and camera button text.

use crate::dom;
use tree_core::{SceneState, SceneStore};
use web_sys as web;

const LOADING_ID: &str = "loading-overlay";
const STATE_LABEL_ID: &str = "state-label";
pub const CAMERA_BUTTON_ID: &str = "camera-toggle";

#[inline]
pub fn hide_loading(document: &web::Document) {
    dom::set_visible(document, LOADING_ID, false);
}

pub fn state_label(state: &SceneState) -> &'static str {
    if state.hand_open {
        "UNLEASH"
    } else {
        "NORMAL"
    }
}

pub fn camera_button_text(state: &SceneState) -> &'static str {
    if state.camera_enabled {
        "Gesture ON"
    } else {
        "Enable Camera"
    }
}

fn apply(document: &web::Document, state: &SceneState) {
    dom::set_text(document, STATE_LABEL_ID, state_label(state));
    dom::set_text(document, CAMERA_BUTTON_ID, camera_button_text(state));
    if let Some(el) = document.get_element_by_id(CAMERA_BUTTON_ID) {
        let _ = el.set_attribute("data-active", if state.camera_enabled { "1" } else { "0" });
    }
}

/// Keep the label and button in sync with the store.
pub fn bind(document: &web::Document, store: &mut SceneStore) {
    apply(document, &store.get());
    let document = document.clone();
    store.subscribe(move |state| apply(&document, state));
}
