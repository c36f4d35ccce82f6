use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, MouseEvent, ScrollBehavior, ScrollToOptions};

use crate::analytics::Tracker;
use crate::config::PageConfig;
use crate::error::Result;
use crate::page::dom;

/// Fragment identifier of an in-page link, without the leading `#`.
pub fn fragment_id(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Scrolls to the fragment's element, leaving room for the fixed header.
/// Returns `false` without scrolling or tracking when nothing matches.
pub fn follow_fragment(
    href: &str,
    lookup: impl Fn(&str) -> Option<f64>,
    header_height: f64,
    tracker: &Tracker,
    scroll_to: impl FnOnce(f64),
) -> bool {
    let Some(id) = fragment_id(href) else {
        return false;
    };
    let Some(element_top) = lookup(id) else {
        debug!("No element with id `{}`", id);
        return false;
    };

    scroll_to(element_top - header_height);
    tracker.track("Navigation", "Scroll Click", id);
    true
}

fn header_height(document: &Document, selector: &str) -> f64 {
    dom::query_html(document, selector)
        .ok()
        .flatten()
        .map(|header| f64::from(header.offset_height()))
        .unwrap_or(0.0)
}

fn element_top(document: &Document, id: &str) -> Option<f64> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .map(|el| f64::from(el.offset_top()))
}

fn smooth_scroll(top: f64) {
    if let Some(window) = web_sys::window() {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        window.scroll_to_with_scroll_to_options(&options);
    }
}

pub fn install(document: &Document, config: &PageConfig, tracker: &Tracker) -> Result<usize> {
    let links = dom::query_all(document, &config.anchor_selector)?;
    for link in &links {
        let link_el = link.clone();
        let document = document.clone();
        let tracker = tracker.clone();
        let header_selector = config.header_selector.clone();

        dom::listen(link, "click", move |e: MouseEvent| {
            e.prevent_default();
            let href = link_el.get_attribute("href").unwrap_or_default();
            follow_fragment(
                &href,
                |id| element_top(&document, id),
                header_height(&document, &header_selector),
                &tracker,
                smooth_scroll,
            );
        })?;
    }
    Ok(links.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{MemorySink, TrackedEvent};
    use std::cell::Cell;

    fn lookup(id: &str) -> Option<f64> {
        match id {
            "features" => Some(900.0),
            "download" => Some(2400.0),
            _ => None,
        }
    }

    #[test]
    fn fragment_id_requires_a_name() {
        assert_eq!(fragment_id("#features"), Some("features"));
        assert_eq!(fragment_id("#"), None);
        assert_eq!(fragment_id("/pricing#plans"), None);
    }

    #[test]
    fn known_fragment_scrolls_below_header_and_tracks_once() {
        let sink = MemorySink::new();
        let tracker = Tracker::new(sink.clone());
        let scrolled = Cell::new(None);

        let followed = follow_fragment("#features", lookup, 80.0, &tracker, |top| {
            scrolled.set(Some(top))
        });

        assert!(followed);
        assert_eq!(scrolled.get(), Some(820.0));
        assert_eq!(
            sink.events(),
            vec![TrackedEvent::new("Navigation", "Scroll Click", "features")]
        );
    }

    #[test]
    fn unknown_fragment_does_nothing() {
        let sink = MemorySink::new();
        let tracker = Tracker::new(sink.clone());
        let scrolled = Cell::new(false);

        let followed = follow_fragment("#missing", lookup, 80.0, &tracker, |_| scrolled.set(true));

        assert!(!followed);
        assert!(!scrolled.get());
        assert!(sink.events().is_empty());
    }
}
