use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("browser window is not available")]
    NoWindow,
    #[error("document is not available")]
    NoDocument,
    #[error("no element matches `{0}`")]
    MissingElement(String),
    #[error("javascript error: {0}")]
    Js(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to convert value: {0}")]
    Serialization(String),
}

impl From<JsValue> for PageError {
    fn from(value: JsValue) -> Self {
        PageError::Js(describe_js(&value).unwrap_or_else(|| "unknown exception".to_string()))
    }
}

/// Best-effort human readable text for a thrown JS value: a plain string,
/// or the `message` property of an `Error`-like object.
pub fn describe_js(value: &JsValue) -> Option<String> {
    if let Some(text) = value.as_string() {
        return Some(text);
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return error.message().as_string();
    }
    if value.is_object() {
        return js_sys::Reflect::get(value, &JsValue::from_str("message"))
            .ok()
            .and_then(|message| message.as_string());
    }
    None
}

pub type Result<T> = std::result::Result<T, PageError>;
