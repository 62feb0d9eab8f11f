use crate::error::{describe_js, Result};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "storage", "sync"], js_name = get, catch)]
    async fn sync_get(keys: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "sync"], js_name = set, catch)]
    async fn sync_set(items: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = get, catch)]
    async fn local_get(keys: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = set, catch)]
    async fn local_set(items: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "onChanged"], js_name = addListener)]
    fn add_storage_listener(callback: &js_sys::Function);

    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = sendMessage, catch)]
    async fn runtime_send_message(message: JsValue) -> std::result::Result<JsValue, JsValue>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageArea {
    Sync,
    Local,
}

impl StorageArea {
    fn name(self) -> &'static str {
        match self {
            StorageArea::Sync => "sync",
            StorageArea::Local => "local",
        }
    }
}

pub async fn read_key<T: DeserializeOwned>(area: StorageArea, key: &str) -> Result<Option<T>> {
    let keys = JsValue::from_str(key);
    let items = match area {
        StorageArea::Sync => sync_get(keys).await?,
        StorageArea::Local => local_get(keys).await?,
    };
    let value = js_sys::Reflect::get(&items, &JsValue::from_str(key))?;
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    Ok(Some(serde_wasm_bindgen::from_value(value)?))
}

pub async fn write_key<T: Serialize>(area: StorageArea, key: &str, value: &T) -> Result<()> {
    let items = js_sys::Object::new();
    js_sys::Reflect::set(&items, &JsValue::from_str(key), &serde_wasm_bindgen::to_value(value)?)?;
    match area {
        StorageArea::Sync => sync_set(items.into()).await?,
        StorageArea::Local => local_set(items.into()).await?,
    };
    Ok(())
}

/// Calls `on_change` with the new value whenever `key` changes in `area`.
pub fn on_key_changed<F>(area: StorageArea, key: &'static str, mut on_change: F)
where
    F: FnMut(JsValue) + 'static,
{
    let closure = Closure::<dyn FnMut(JsValue, String)>::new(move |changes: JsValue, area_name: String| {
        if area_name != area.name() {
            return;
        }
        let Ok(change) = js_sys::Reflect::get(&changes, &JsValue::from_str(key)) else {
            return;
        };
        if change.is_undefined() {
            return;
        }
        match js_sys::Reflect::get(&change, &JsValue::from_str("newValue")) {
            Ok(value) => on_change(value),
            Err(err) => warn!("storage change for {key} unreadable: {}", describe_js(&err)),
        }
    });
    add_storage_listener(closure.as_ref().unchecked_ref());
    closure.forget();
}

pub async fn send_message(message: JsValue) -> Result<JsValue> {
    Ok(runtime_send_message(message).await?)
}

pub fn set_timeout<F>(delay_ms: i32, callback: F)
where
    F: FnOnce() + 'static,
{
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(callback);
    if let Err(err) = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms)
    {
        warn!("timer not scheduled: {}", describe_js(&err));
    }
}

pub fn current_href() -> Option<String> {
    web_sys::window()?.location().href().ok()
}

pub fn current_hostname() -> Option<String> {
    web_sys::window()?.location().hostname().ok()
}
