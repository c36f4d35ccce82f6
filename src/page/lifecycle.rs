use log::error;
use wasm_bindgen::JsValue;
use web_sys::{js_sys, Document, ErrorEvent, PromiseRejectionEvent, Window};

use crate::analytics::Tracker;
use crate::error::{describe_js, Result};
use crate::page::dom;

pub fn track_visibility(tracker: &Tracker, hidden: bool) {
    if hidden {
        tracker.track("Page", "Hidden", "Tab Switch");
    } else {
        tracker.track("Page", "Visible", "Tab Return");
    }
}

pub fn track_script_error(tracker: &Tracker, message: Option<String>) {
    let label = message.filter(|m| !m.is_empty());
    tracker.track(
        "Error",
        "JavaScript",
        label.as_deref().unwrap_or("Unknown error"),
    );
}

pub fn track_rejection(tracker: &Tracker, message: Option<String>) {
    let label = message.filter(|m| !m.is_empty());
    tracker.track(
        "Error",
        "Promise Rejection",
        label.as_deref().unwrap_or("Unknown rejection"),
    );
}

/// Shape of a thrown value or rejection reason, as far as labelling goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thrown {
    Missing,
    /// A string, number or other non-object; it has no `message`.
    Primitive,
    Object { message: Option<String> },
}

impl Thrown {
    pub fn from_js(value: &JsValue) -> Self {
        if value.is_undefined() || value.is_null() {
            return Thrown::Missing;
        }
        if !value.is_object() {
            return Thrown::Primitive;
        }
        let message = js_sys::Reflect::get(value, &JsValue::from_str("message"))
            .ok()
            .and_then(|m| m.as_string());
        Thrown::Object { message }
    }

    /// The `message` property, the only thing used as an analytics label.
    pub fn message(self) -> Option<String> {
        match self {
            Thrown::Object { message } => message,
            Thrown::Missing | Thrown::Primitive => None,
        }
    }
}

pub fn install(window: &Window, document: &Document, tracker: &Tracker) -> Result<()> {
    {
        let tracker = tracker.clone();
        let doc = document.clone();
        dom::listen(document, "visibilitychange", move |_: web_sys::Event| {
            track_visibility(&tracker, doc.hidden());
        })?;
    }
    {
        let tracker = tracker.clone();
        dom::listen(window, "error", move |e: ErrorEvent| {
            let thrown = e.error();
            error!(
                "JavaScript error: {}",
                describe_js(&thrown).unwrap_or_else(|| e.message())
            );
            track_script_error(&tracker, Thrown::from_js(&thrown).message());
        })?;
    }
    {
        let tracker = tracker.clone();
        dom::listen(window, "unhandledrejection", move |e: PromiseRejectionEvent| {
            let reason = e.reason();
            error!(
                "Unhandled promise rejection: {}",
                describe_js(&reason).unwrap_or_else(|| "unknown".to_string())
            );
            track_rejection(&tracker, Thrown::from_js(&reason).message());
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{MemorySink, TrackedEvent};

    #[test]
    fn visibility_changes_map_to_tab_events() {
        let sink = MemorySink::new();
        let tracker = Tracker::new(sink.clone());
        track_visibility(&tracker, true);
        track_visibility(&tracker, false);
        assert_eq!(
            sink.events(),
            vec![
                TrackedEvent::new("Page", "Hidden", "Tab Switch"),
                TrackedEvent::new("Page", "Visible", "Tab Return"),
            ]
        );
    }

    #[test]
    fn only_a_message_property_becomes_the_label() {
        let sink = MemorySink::new();
        let tracker = Tracker::new(sink.clone());

        // Promise.reject("nope") and `throw "boom"`
        track_rejection(&tracker, Thrown::Primitive.message());
        track_script_error(&tracker, Thrown::Primitive.message());
        // a null `error`, e.g. a cross-origin "Script error."
        track_script_error(&tracker, Thrown::Missing.message());
        track_rejection(&tracker, Thrown::Object { message: None }.message());
        track_rejection(
            &tracker,
            Thrown::Object {
                message: Some("fetch failed".to_string()),
            }
            .message(),
        );

        assert_eq!(
            sink.events(),
            vec![
                TrackedEvent::new("Error", "Promise Rejection", "Unknown rejection"),
                TrackedEvent::new("Error", "JavaScript", "Unknown error"),
                TrackedEvent::new("Error", "JavaScript", "Unknown error"),
                TrackedEvent::new("Error", "Promise Rejection", "Unknown rejection"),
                TrackedEvent::new("Error", "Promise Rejection", "fetch failed"),
            ]
        );
    }

    #[test]
    fn errors_fall_back_to_unknown_labels() {
        let sink = MemorySink::new();
        let tracker = Tracker::new(sink.clone());
        track_script_error(&tracker, Some("x is not defined".to_string()));
        track_script_error(&tracker, None);
        track_rejection(&tracker, Some(String::new()));
        assert_eq!(
            sink.events(),
            vec![
                TrackedEvent::new("Error", "JavaScript", "x is not defined"),
                TrackedEvent::new("Error", "JavaScript", "Unknown error"),
                TrackedEvent::new("Error", "Promise Rejection", "Unknown rejection"),
            ]
        );
    }
}
