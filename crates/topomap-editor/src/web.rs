#![cfg(target_arch = "wasm32")]

use crate::actions::Action;
use crate::create_app;
use eframe::{egui, WebRunner};
use std::path::Path;
use std::sync::mpsc::Sender;
use topomap::FileFormat;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;

/// Launch the egui app inside the canvas referenced by `index.html`.
#[wasm_bindgen]
pub async fn start() -> Result<(), JsValue> {
    use web_sys::HtmlCanvasElement;

    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let document = web_sys::window()
        .ok_or("No window")?
        .document()
        .ok_or("No document")?;

    let canvas = document
        .get_element_by_id("the_canvas_id")
        .ok_or("Canvas not found")?
        .dyn_into::<HtmlCanvasElement>()?;

    let web_options = eframe::WebOptions::default();

    WebRunner::new()
        .start(canvas, web_options, Box::new(|cc| Ok(Box::new(create_app(cc)))))
        .await
}

/// Ask the browser for a map file; its contents come back as an action.
pub fn open_map_dialog(ctx: egui::Context, sender: Sender<Action>) {
    use rfd::AsyncFileDialog;
    use wasm_bindgen_futures::spawn_local;

    let task = AsyncFileDialog::new()
        .add_filter("Topology map", &["yaml", "yml", "json"])
        .pick_file();

    spawn_local(async move {
        let Some(file) = task.await else {
            return;
        };
        let source_name = file.file_name();
        let action = match String::from_utf8(file.read().await) {
            Ok(text) => Action::LoadFromText {
                format: FileFormat::from_path(Path::new(&source_name)),
                text,
                source_name: source_name.clone(),
            },
            Err(e) => Action::ReportError {
                message: format!("Failed to load {source_name}: {e}"),
            },
        };
        if sender.send(action).is_err() {
            log::warn!("editor closed before {source_name} was read");
        }
        ctx.request_repaint();
    });
}

/// Save `text` through a temporary object URL and a synthetic link click.
pub fn download_map(file_name: &str, text: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .ok_or("No window")?
        .document()
        .ok_or("No document")?;

    let parts = js_sys::Array::of1(&JsValue::from_str(text));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type("text/plain");
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let anchor = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    web_sys::Url::revoke_object_url(&url)
}
