//! Client-side enhancements for the IntelDrop landing page: smooth anchor
//! scrolling, fade-in reveals, app-store button analytics, the scrolled
//! header, and the accessibility and performance helpers around them.

use wasm_bindgen::prelude::*;
use web_sys::Element;

pub mod analytics;
pub mod config;
pub mod controller;
pub mod error;
pub mod globals;
pub mod timing;

pub mod page {
    pub mod a11y;
    pub mod buttons;
    pub mod dom;
    pub mod lifecycle;
    pub mod media;
    pub mod nav;
    pub mod reveal;
    pub mod scroll;
    pub mod viewport;
}

use analytics::Tracker;
use config::PageConfig;
use error::{PageError, Result};
use page::{dom, scroll::ScrollMetrics, viewport};

/// Loads configuration and installs the page behaviors as soon as the
/// document has been parsed.
pub fn start() -> Result<()> {
    let window = dom::window()?;
    let document = window.document().ok_or(PageError::NoDocument)?;
    let config = PageConfig::load_or_default(&window);

    if let Err(err) = globals::publish(&window) {
        log::warn!("Could not publish window.{}: {}", globals::GLOBAL_NAME, err);
    }

    if document.ready_state() == "loading" {
        dom::listen(&document, "DOMContentLoaded", move |_: web_sys::Event| {
            controller::boot(config.clone());
        })?;
    } else {
        controller::boot(config);
    }
    Ok(())
}

/// `trackEvent(category, action, label)` for page scripts.
#[wasm_bindgen(js_name = trackEvent)]
pub fn track_event(category: &str, action: &str, label: &str) {
    let tracker = controller::active_tracker()
        .unwrap_or_else(|| Tracker::gtag(&PageConfig::default().analytics_function));
    tracker.track(category, action, label);
}

/// Current scroll depth in percent, `undefined` when the page cannot scroll.
#[wasm_bindgen(js_name = scrollPercentage)]
pub fn scroll_percentage() -> Option<f64> {
    let window = web_sys::window()?;
    let document = window.document()?;
    ScrollMetrics::read(&window, &document).percentage()
}

#[wasm_bindgen(js_name = isInViewport)]
pub fn is_in_viewport(element: &Element) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let (width, height) = viewport::viewport_size(&window);
    viewport::Bounds::of(element).fits_within(width, height)
}
