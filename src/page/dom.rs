//! Thin helpers over `web-sys` shared by the page behaviors.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    js_sys, Document, Element, EventTarget, HtmlElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, Window,
};

use crate::error::{PageError, Result};
use crate::page::reveal::RevealTracker;

pub fn window() -> Result<Window> {
    web_sys::window().ok_or(PageError::NoWindow)
}

pub fn document() -> Result<Document> {
    window()?.document().ok_or(PageError::NoDocument)
}

pub fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>> {
    let nodes = document.query_selector_all(selector)?;
    let elements = (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect();
    Ok(elements)
}

pub fn query_html(document: &Document, selector: &str) -> Result<Option<HtmlElement>> {
    Ok(document
        .query_selector(selector)?
        .and_then(|el| el.dyn_into::<HtmlElement>().ok()))
}

/// Adds or removes `class`. A failure is logged and reported as `false`.
pub fn set_class(element: &Element, class: &str, on: bool) -> bool {
    let classes = element.class_list();
    let result = if on {
        classes.add_1(class)
    } else {
        classes.remove_1(class)
    };
    class_change_applied(class, result)
}

fn class_change_applied<E: fmt::Debug>(class: &str, result: std::result::Result<(), E>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            debug!("Could not toggle `{}`: {:?}", class, err);
            false
        }
    }
}

/// Attaches a listener for the page lifetime.
pub fn listen<E, F>(target: &EventTarget, event: &str, mut handler: F) -> Result<()>
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        if let Ok(event) = event.dyn_into::<E>() {
            handler(event);
        }
    });
    target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

/// Observer tuning for [`observe_once`]. `None` keeps the browser defaults.
#[derive(Debug, Clone, Default)]
pub struct ObserveOptions {
    pub threshold: Option<f64>,
    pub root_margin: Option<String>,
}

/// Calls `on_visible` the first time each element intersects the viewport,
/// then stops watching it. Returns how many elements are observed.
pub fn observe_once<F>(elements: Vec<Element>, options: &ObserveOptions, on_visible: F) -> Result<usize>
where
    F: Fn(&Element) + 'static,
{
    if elements.is_empty() {
        return Ok(0);
    }

    let watched = Rc::new(elements);
    let tracker = Rc::new(RefCell::new(RevealTracker::new(watched.len())));

    let callback = {
        let watched = Rc::clone(&watched);
        Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, observer: IntersectionObserver| {
                let hits = entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                    .filter_map(|entry| {
                        let target = entry.target();
                        watched
                            .iter()
                            .position(|el| *el == target)
                            .map(|index| (index, entry.is_intersecting()))
                    })
                    .collect::<Vec<_>>();

                let revealed = tracker.borrow_mut().on_entries(hits);
                for index in revealed {
                    let element = &watched[index];
                    on_visible(element);
                    observer.unobserve(element);
                }
            },
        )
    };

    let init = IntersectionObserverInit::new();
    if let Some(threshold) = options.threshold {
        init.set_threshold(&JsValue::from_f64(threshold));
    }
    if let Some(margin) = &options.root_margin {
        init.set_root_margin(margin);
    }
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    callback.forget();

    for element in watched.iter() {
        observer.observe(element);
    }
    debug!("Observing {} element(s) once", watched.len());
    Ok(watched.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_failures_are_reported_not_raised() {
        assert!(class_change_applied::<&str>("scrolled", Ok(())));
        assert!(!class_change_applied("scrolled", Err("InvalidCharacterError")));
    }
}
