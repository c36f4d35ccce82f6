use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, KeyboardEvent, MouseEvent};

use crate::analytics::Tracker;
use crate::config::PageConfig;
use crate::error::Result;
use crate::page::dom;
use crate::timing::{BrowserTimers, Scheduler};

pub const CATEGORY: &str = "App Store";
pub const LABEL: &str = "Download Button";

/// Keys that activate a focused button, as a native `<button>` would.
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}

/// Behavior of an app-store call-to-action button.
#[derive(Debug, Clone)]
pub struct CtaButton<S: Scheduler> {
    tracker: Tracker,
    scheduler: S,
    loading_ms: Option<u32>,
}

impl<S: Scheduler> CtaButton<S> {
    pub fn new(tracker: Tracker, scheduler: S, loading_ms: Option<u32>) -> Self {
        Self {
            tracker,
            scheduler,
            loading_ms,
        }
    }

    /// Tracks the click and, when configured, pulses the loading state.
    /// The destination URL is left to the host page, so nothing navigates.
    pub fn click(&self, set_loading: impl Fn(bool) + 'static) {
        self.tracker.track(CATEGORY, "Click", LABEL);

        if let Some(ms) = self.loading_ms {
            set_loading(true);
            let handle = self.scheduler.schedule(ms, Box::new(move || set_loading(false)));
            self.scheduler.detach(handle);
        }
    }

    pub fn hover(&self) {
        self.tracker.track(CATEGORY, "Hover", LABEL);
    }
}

fn loading_toggle(element: &Element, class: &str) -> impl Fn(bool) + 'static {
    let element = element.clone();
    let class = class.to_string();
    move |on| {
        dom::set_class(&element, &class, on);
    }
}

/// Gives a non-button element button semantics for keyboard users.
fn make_keyboard_accessible(element: &Element) -> Result<()> {
    element.set_attribute("role", "button")?;
    element.set_attribute("tabindex", "0")?;

    let Some(html) = element.dyn_ref::<HtmlElement>().cloned() else {
        return Ok(());
    };
    dom::listen(element, "keydown", move |e: KeyboardEvent| {
        if is_activation_key(&e.key()) {
            e.prevent_default();
            html.click();
        }
    })
}

/// Runs `wire` for every button. A button that cannot be wired is logged
/// and skipped so the remaining buttons still get their listeners.
fn wire_each<T>(buttons: &[T], mut wire: impl FnMut(&T) -> Result<()>) -> usize {
    buttons
        .iter()
        .enumerate()
        .filter(|(index, button)| match wire(*button) {
            Ok(()) => true,
            Err(err) => {
                warn!("Failed to wire app store button #{}: {}", index, err);
                false
            }
        })
        .count()
}

fn wire_button(
    button: &Element,
    behavior: &CtaButton<BrowserTimers>,
    config: &PageConfig,
) -> Result<()> {
    {
        let behavior = behavior.clone();
        let element = button.clone();
        let loading_class = config.loading_class.clone();
        dom::listen(button, "click", move |_: MouseEvent| {
            behavior.click(loading_toggle(&element, &loading_class));
        })?;
    }
    {
        let behavior = behavior.clone();
        dom::listen(button, "mouseenter", move |_: MouseEvent| behavior.hover())?;
    }
    if config.enhanced {
        make_keyboard_accessible(button)?;
    }
    Ok(())
}

/// Returns how many buttons were fully wired.
pub fn install(document: &Document, config: &PageConfig, tracker: &Tracker) -> Result<usize> {
    let buttons = dom::query_all(document, &config.button_selector)?;
    let behavior = CtaButton::new(tracker.clone(), BrowserTimers, config.loading_window_ms());
    Ok(wire_each(&buttons, |button| wire_button(button, &behavior, config)))
}
