//! VIP Watch: flags webmail messages that mention people on a VIP list.
//!
//! Runs as the extension's content script. Mutation batches from the mailbox
//! are matched against the stored VIP list; matching messages get an in-place
//! banner and the background worker raises a system notification.
//!
//! The list operations are also exported for the extension popup.

pub mod annotator;
pub mod config;
pub mod content;
pub mod detect_core;
pub mod error;
pub mod fragments;
pub mod host;
pub mod name_store;
pub mod navigation;
pub mod notifier;
pub mod remote_store;
pub mod scan;
pub mod vip_list;
pub mod watcher;

use crate::error::{Result, VipError};
use crate::name_store::NameListStore;
use log::error;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    content::boot();
}

#[derive(Serialize)]
struct BackendStatus {
    shared: bool,
    message: String,
}

fn exported<T: Serialize>(operation: &str, result: Result<T>) -> std::result::Result<JsValue, JsValue> {
    let value = result.and_then(|value| Ok(serde_wasm_bindgen::to_value(&value)?));
    value.map_err(|err: VipError| {
        error!("{operation} failed: {err}");
        err.into()
    })
}

#[wasm_bindgen]
pub async fn list_vips() -> std::result::Result<JsValue, JsValue> {
    let store = NameListStore::connect().await;
    exported("list", store.sync().await.map(Vec::<String>::from))
}

#[wasm_bindgen]
pub async fn add_vip(name: String) -> std::result::Result<JsValue, JsValue> {
    let store = NameListStore::connect().await;
    exported("add", store.add(&name).await.map(Vec::<String>::from))
}

#[wasm_bindgen]
pub async fn remove_vip(name: String) -> std::result::Result<JsValue, JsValue> {
    let store = NameListStore::connect().await;
    exported("remove", store.remove(&name).await.map(Vec::<String>::from))
}

#[wasm_bindgen]
pub async fn backend_status() -> std::result::Result<JsValue, JsValue> {
    let status = match config::load_backend_config().await {
        Ok(backend) => BackendStatus {
            shared: true,
            message: format!("Shared list connected ({})", backend.project_id),
        },
        Err(err) => BackendStatus {
            shared: false,
            message: format!("Using local storage ({err})"),
        },
    };
    exported("status", Ok(status))
}
