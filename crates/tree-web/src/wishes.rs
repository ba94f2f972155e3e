//! Wishes panel, persistence calls and the DOM name-tags that follow the
//! orbiting diamonds.

use crate::config::WishEndpoint;
use crate::dom;
use crate::remote;
use chrono::{DateTime, TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tree_core::constants::WISH_LIST_LIMIT;
use tree_core::{Scene, Wish, WishDraft};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

const PANEL_ID: &str = "wishes-panel";
const OPEN_ID: &str = "wishes-open";
const CLOSE_ID: &str = "wishes-close";
const SUBMIT_ID: &str = "wish-submit";
const NAME_ID: &str = "wish-name";
const MESSAGE_ID: &str = "wish-message";
const ERROR_ID: &str = "wish-error";
const LIST_ID: &str = "wish-list";
const TAGS_ID: &str = "wish-tags";

fn js_err(e: wasm_bindgen::JsValue) -> anyhow::Error {
    anyhow::anyhow!("{:?}", e)
}

async fn send(
    method: &str,
    url: &str,
    endpoint: &WishEndpoint,
    body: Option<String>,
) -> anyhow::Result<Vec<Wish>> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let headers = web::Headers::new().map_err(js_err)?;
    for (name, value) in endpoint.headers(body.is_some()) {
        headers.set(name, &value).map_err(js_err)?;
    }
    let opts = web::RequestInit::new();
    opts.set_method(method);
    opts.set_mode(web::RequestMode::Cors);
    opts.set_headers(&headers);
    if let Some(body) = body.as_deref() {
        opts.set_body(&body.into());
    }
    let request = web::Request::new_with_str_and_init(url, &opts).map_err(js_err)?;
    let resp: web::Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| anyhow::anyhow!("fetch failed: {:?}", e))?
        .dyn_into()
        .map_err(|_| anyhow::anyhow!("invalid response"))?;
    if !resp.ok() {
        anyhow::bail!("HTTP {}", resp.status());
    }
    let text = JsFuture::from(resp.text().map_err(js_err)?)
        .await
        .map_err(js_err)?
        .as_string()
        .unwrap_or_default();
    Ok(remote::parse_rows(&text)?)
}

async fn insert(endpoint: &WishEndpoint, draft: &WishDraft) -> anyhow::Result<Wish> {
    let body = remote::insert_body(draft)?;
    send("POST", &endpoint.insert_url(), endpoint, Some(body))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("insert returned no rows"))
}

fn now() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(dom::now_ms() as i64)
        .single()
        .unwrap_or_default()
}

fn render_list(document: &web::Document, scene: &Scene) {
    let Some(list) = document.get_element_by_id(LIST_ID) else {
        return;
    };
    list.set_inner_html("");
    for wish in scene.wishes().recent(WISH_LIST_LIMIT) {
        let Ok(item) = document.create_element("li") else {
            continue;
        };
        let _ = item.set_attribute("class", "wish");
        for (class, text) in [
            ("wish-name", wish.name.clone()),
            ("wish-text", wish.message.clone()),
            ("wish-time", wish.created_at.format("%m-%d %H:%M").to_string()),
        ] {
            if let Ok(span) = document.create_element("span") {
                let _ = span.set_attribute("class", class);
                span.set_text_content(Some(&text));
                let _ = item.append_child(&span);
            }
        }
        let _ = list.append_child(&item);
    }
}

fn add_wish(document: &web::Document, scene: &RefCell<Scene>, wish: Wish) {
    let mut scene = scene.borrow_mut();
    scene.wishes_mut().add(wish);
    render_list(document, &scene);
}

fn read_form(document: &web::Document) -> (String, String) {
    let name = dom::typed::<web::HtmlInputElement>(document, NAME_ID)
        .map(|el| el.value())
        .unwrap_or_default();
    let message = dom::typed::<web::HtmlTextAreaElement>(document, MESSAGE_ID)
        .map(|el| el.value())
        .unwrap_or_default();
    (name, message)
}

fn clear_form(document: &web::Document) {
    if let Some(el) = dom::typed::<web::HtmlInputElement>(document, NAME_ID) {
        el.set_value("");
    }
    if let Some(el) = dom::typed::<web::HtmlTextAreaElement>(document, MESSAGE_ID) {
        el.set_value("");
    }
}

/// Wire the panel buttons and the form, then load the recent list.
pub fn install(document: &web::Document, scene: Rc<RefCell<Scene>>, endpoint: Option<WishEndpoint>) {
    dom::set_visible(document, PANEL_ID, false);
    {
        let doc = document.clone();
        dom::add_click_listener(document, OPEN_ID, move || dom::set_visible(&doc, PANEL_ID, true));
    }
    {
        let doc = document.clone();
        dom::add_click_listener(document, CLOSE_ID, move || dom::set_visible(&doc, PANEL_ID, false));
    }

    let submitting = Rc::new(Cell::new(false));
    {
        let doc = document.clone();
        let scene = scene.clone();
        let endpoint = endpoint.clone();
        dom::add_click_listener(document, SUBMIT_ID, move || {
            if submitting.get() {
                return;
            }
            let (name, message) = read_form(&doc);
            let draft = match WishDraft::new(&name, &message) {
                Ok(d) => d,
                Err(e) => {
                    dom::set_text(&doc, ERROR_ID, &e.to_string());
                    return;
                }
            };
            dom::set_text(&doc, ERROR_ID, "");
            submitting.set(true);
            let doc = doc.clone();
            let scene = scene.clone();
            let endpoint = endpoint.clone();
            let submitting = submitting.clone();
            spawn_local(async move {
                let stored = match &endpoint {
                    Some(ep) => insert(ep, &draft).await,
                    None => Err(anyhow::anyhow!("offline")),
                };
                let wish = match stored {
                    Ok(w) => {
                        log::info!("[wishes] stored #{}", w.id);
                        w
                    }
                    Err(e) => {
                        log::warn!("[wishes] persistence failed, keeping local copy: {e}");
                        draft.into_synthetic(now())
                    }
                };
                add_wish(&doc, &scene, wish);
                clear_form(&doc);
                submitting.set(false);
            });
        });
    }

    if let Some(ep) = endpoint {
        let doc = document.clone();
        spawn_local(async move {
            match send("GET", &ep.list_url(), &ep, None).await {
                Ok(rows) => {
                    log::info!("[wishes] loaded {} wishes", rows.len());
                    let mut s = scene.borrow_mut();
                    s.wishes_mut().extend(rows);
                    render_list(&doc, &s);
                }
                Err(e) => log::warn!("[wishes] list failed: {e}"),
            }
        });
    }
}

/// DOM labels placed over the orbiting wish diamonds.
pub struct NameTags {
    container: Option<web::Element>,
    tags: Vec<web::HtmlElement>,
}

impl NameTags {
    pub fn new(document: &web::Document) -> Self {
        Self {
            container: document.get_element_by_id(TAGS_ID),
            tags: Vec::new(),
        }
    }

    pub fn sync(&mut self, document: &web::Document, scene: &Scene) {
        let Some(container) = &self.container else {
            return;
        };
        let wishes = scene.wishes().orbiting();
        let positions = scene.wish_positions();
        while self.tags.len() < wishes.len() {
            let Some(tag) = document
                .create_element("div")
                .ok()
                .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
            else {
                return;
            };
            let _ = tag.set_attribute("class", "wish-tag");
            let _ = container.append_child(&tag);
            self.tags.push(tag);
        }
        for (i, tag) in self.tags.iter().enumerate() {
            let placed = wishes
                .get(i)
                .zip(positions.get(i))
                .and_then(|(w, p)| scene.camera().project_to_uv(*p).map(|uv| (w, uv)));
            let style = tag.style();
            match placed {
                Some((wish, uv)) => {
                    if tag.text_content().as_deref() != Some(wish.name.as_str()) {
                        tag.set_text_content(Some(&wish.name));
                    }
                    let _ = style.set_property("display", "block");
                    let _ = style.set_property("left", &format!("{:.2}%", uv[0] * 100.0));
                    let _ = style.set_property("top", &format!("{:.2}%", uv[1] * 100.0));
                }
                None => {
                    let _ = style.set_property("display", "none");
                }
            }
        }
    }
}
