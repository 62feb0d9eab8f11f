use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("VIP name cannot be empty")]
    Empty,
    #[error("{0} is already in your list")]
    Duplicate(String),
    #[error("{0} is not in your list")]
    Missing(String),
}

#[derive(Debug, Error)]
pub enum VipError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },
    #[error("host error: {0}")]
    Js(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("conversion error: {0}")]
    Serde(#[from] serde_wasm_bindgen::Error),
    #[error(transparent)]
    List(#[from] ListError),
}

pub type Result<T, E = VipError> = std::result::Result<T, E>;

impl From<JsValue> for VipError {
    fn from(value: JsValue) -> Self {
        VipError::Js(describe_js(&value))
    }
}

impl From<VipError> for JsValue {
    fn from(err: VipError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub fn describe_js(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}
