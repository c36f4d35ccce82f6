//! `window.IntelDrop`, the handle inline page scripts use to reach the
//! tracker and the scroll/viewport helpers.

use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsValue;
use web_sys::{js_sys, Element, Window};

use crate::error::Result;
use crate::timing::{BrowserTimers, Debounce};

pub const GLOBAL_NAME: &str = "IntelDrop";
pub const UTILS: &str = "utils";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Export {
    TrackEvent,
    Debounce,
    IsInViewport,
    GetScrollPercentage,
}

impl Export {
    pub const ALL: [Export; 4] = [
        Export::TrackEvent,
        Export::Debounce,
        Export::IsInViewport,
        Export::GetScrollPercentage,
    ];

    /// Namespace under the global (`None` for the top level) and key.
    pub fn path(self) -> (Option<&'static str>, &'static str) {
        match self {
            Export::TrackEvent => (None, "trackEvent"),
            Export::Debounce => (Some(UTILS), "debounce"),
            Export::IsInViewport => (Some(UTILS), "isInViewport"),
            Export::GetScrollPercentage => (Some(UTILS), "getScrollPercentage"),
        }
    }

    fn function(self) -> JsValue {
        match self {
            Export::TrackEvent => Closure::<dyn Fn(String, String, String)>::new(
                |category: String, action: String, label: String| {
                    crate::track_event(&category, &action, &label)
                },
            )
            .into_js_value(),
            Export::Debounce => {
                Closure::<dyn Fn(js_sys::Function, u32) -> JsValue>::new(debounce).into_js_value()
            }
            Export::IsInViewport => {
                Closure::<dyn Fn(Element) -> bool>::new(|element: Element| {
                    crate::is_in_viewport(&element)
                })
                .into_js_value()
            }
            Export::GetScrollPercentage => {
                Closure::<dyn Fn() -> Option<f64>>::new(crate::scroll_percentage).into_js_value()
            }
        }
    }
}

/// `IntelDrop.utils.debounce(fn, wait)`: returns a function that forwards
/// its first argument to `fn` once calls stop for `wait` milliseconds.
fn debounce(func: js_sys::Function, wait_ms: u32) -> JsValue {
    let debounced = Debounce::new(BrowserTimers, wait_ms, move |arg: JsValue| {
        if let Err(err) = func.call1(&JsValue::UNDEFINED, &arg) {
            warn!("Debounced callback threw: {:?}", err);
        }
    });
    Closure::<dyn Fn(JsValue)>::new(move |arg: JsValue| debounced.call(arg)).into_js_value()
}

/// Sets `window.IntelDrop = { trackEvent, utils: { ... } }`.
pub fn publish(window: &Window) -> Result<()> {
    let root = js_sys::Object::new();
    let utils = js_sys::Object::new();

    for export in Export::ALL {
        let (namespace, key) = export.path();
        let target = if namespace.is_some() { &utils } else { &root };
        js_sys::Reflect::set(target, &JsValue::from_str(key), &export.function())?;
    }
    js_sys::Reflect::set(&root, &JsValue::from_str(UTILS), &utils)?;
    js_sys::Reflect::set(window, &JsValue::from_str(GLOBAL_NAME), &root)?;
    debug!("Published window.{}", GLOBAL_NAME);
    Ok(())
}
