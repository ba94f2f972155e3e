//! Gallery images: decode in the browser, read back RGBA through a 2D canvas
//! and hand the pixels to the renderer.

use std::cell::RefCell;
use std::rc::Rc;
use tree_render::Renderer;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

/// Longest edge kept after downscaling.
const MAX_EDGE: u32 = 1024;

fn fit(width: u32, height: u32) -> (u32, u32) {
    let longest = width.max(height).max(1);
    if longest <= MAX_EDGE {
        return (width.max(1), height.max(1));
    }
    let s = MAX_EDGE as f64 / longest as f64;
    (
        ((width as f64 * s).round() as u32).max(1),
        ((height as f64 * s).round() as u32).max(1),
    )
}

async fn load_rgba(document: &web::Document, url: &str) -> anyhow::Result<(u32, u32, Vec<u8>)> {
    let img = web::HtmlImageElement::new().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    img.set_cross_origin(Some("anonymous"));
    img.set_src(url);
    JsFuture::from(img.decode())
        .await
        .map_err(|e| anyhow::anyhow!("decode failed: {:?}", e))?;
    let (w, h) = fit(img.natural_width(), img.natural_height());

    let canvas = document
        .create_element("canvas")
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    canvas.set_width(w);
    canvas.set_height(h);
    let ctx = canvas
        .get_context("2d")
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .ok_or_else(|| anyhow::anyhow!("no 2d context"))?
        .dyn_into::<web::CanvasRenderingContext2d>()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    ctx.draw_image_with_html_image_element_and_dw_and_dh(&img, 0.0, 0.0, w as f64, h as f64)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let data = ctx
        .get_image_data(0.0, 0.0, w as f64, h as f64)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok((w, h, data.data().0))
}

/// Start loading every photo; each slot is filled as soon as it decodes.
pub fn load_all(urls: Vec<String>, renderer: Rc<RefCell<Renderer<'static>>>) {
    let Some(document) = crate::dom::window_document() else {
        return;
    };
    for (index, url) in urls.into_iter().enumerate() {
        let document = document.clone();
        let renderer = renderer.clone();
        spawn_local(async move {
            let result = match load_rgba(&document, &url).await {
                Ok((w, h, rgba)) => renderer.borrow_mut().upload_photo(index, w, h, &rgba),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                log::warn!("[render] photo {index} ({url}) kept placeholder: {e}");
            }
        });
    }
}
