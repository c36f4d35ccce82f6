#[cfg(test)]
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::{debug, info, warn};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys;

use crate::error::PageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedEvent {
    pub category: String,
    pub action: String,
    pub label: String,
}

impl TrackedEvent {
    pub fn new(category: &str, action: &str, label: &str) -> Self {
        Self {
            category: category.to_string(),
            action: action.to_string(),
            label: label.to_string(),
        }
    }
}

impl fmt::Display for TrackedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.category, self.action, self.label)
    }
}

/// Destination for tracked events.
pub trait AnalyticsSink {
    fn send(&self, event: &TrackedEvent) -> Result<(), PageError>;
}

/// Payload of a GA4 `gtag("event", action, params)` call.
#[derive(Debug, Serialize)]
struct GtagParams<'a> {
    event_category: &'a str,
    event_label: &'a str,
    value: u32,
}

/// Forwards events to a global analytics function such as `gtag`.
/// A missing or non-callable global makes every send a no-op.
#[derive(Debug, Clone)]
pub struct GtagSink {
    function_name: String,
}

impl GtagSink {
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
        }
    }

    fn lookup(&self) -> Result<GlobalSlot<js_sys::Function>, PageError> {
        let Some(window) = web_sys::window() else {
            return Ok(GlobalSlot::Absent);
        };
        let value = js_sys::Reflect::get(&window, &JsValue::from_str(&self.function_name))?;
        if value.is_undefined() || value.is_null() {
            return Ok(GlobalSlot::Absent);
        }
        Ok(match value.dyn_into::<js_sys::Function>() {
            Ok(function) => GlobalSlot::Callable(function),
            Err(_) => GlobalSlot::NotCallable,
        })
    }
}

/// What the page holds under the analytics function's name.
#[derive(Debug)]
enum GlobalSlot<F> {
    Absent,
    NotCallable,
    Callable(F),
}

/// Calls into the slot only when it holds a function; anything else is a
/// successful no-op.
fn forward<F>(
    slot: GlobalSlot<F>,
    call: impl FnOnce(F) -> Result<(), PageError>,
) -> Result<(), PageError> {
    match slot {
        GlobalSlot::Callable(function) => call(function),
        GlobalSlot::Absent => Ok(()),
        GlobalSlot::NotCallable => {
            debug!("Analytics global is not callable; skipping");
            Ok(())
        }
    }
}

impl AnalyticsSink for GtagSink {
    fn send(&self, event: &TrackedEvent) -> Result<(), PageError> {
        forward(self.lookup()?, |gtag| call_gtag(&gtag, event))
    }
}

fn call_gtag(gtag: &js_sys::Function, event: &TrackedEvent) -> Result<(), PageError> {
    let params = GtagParams {
        event_category: &event.category,
        event_label: &event.label,
        value: 1,
    };
    // Plain objects, not `Map`s, so gtag can read the fields.
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    let params = params
        .serialize(&serializer)
        .map_err(|e| PageError::Serialization(e.to_string()))?;

    gtag.call3(
        &JsValue::UNDEFINED,
        &JsValue::from_str("event"),
        &JsValue::from_str(&event.action),
        &params,
    )?;
    Ok(())
}

/// Keeps every event in memory.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Rc<RefCell<Vec<TrackedEvent>>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TrackedEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, category: &str, action: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.category == category && e.action == action)
            .count()
    }
}

#[cfg(test)]
impl AnalyticsSink for MemorySink {
    fn send(&self, event: &TrackedEvent) -> Result<(), PageError> {
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}

/// Shared, cheaply clonable handle every behavior reports through.
#[derive(Clone)]
pub struct Tracker {
    sink: Rc<dyn AnalyticsSink>,
}

impl Tracker {
    pub fn new(sink: impl AnalyticsSink + 'static) -> Self {
        Self {
            sink: Rc::new(sink),
        }
    }

    pub fn gtag(function_name: &str) -> Self {
        Self::new(GtagSink::new(function_name))
    }

    /// Records one event. Sink failures are logged and dropped.
    pub fn track(&self, category: &str, action: &str, label: &str) {
        let event = TrackedEvent::new(category, action, label);
        if let Err(err) = self.sink.send(&event) {
            warn!("Failed to forward event {}: {}", event, err);
        }
        info!("Event tracked: {}", event);
    }
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct BrokenSink {
        attempts: Rc<Cell<u32>>,
    }

    impl AnalyticsSink for BrokenSink {
        fn send(&self, _event: &TrackedEvent) -> Result<(), PageError> {
            self.attempts.set(self.attempts.get() + 1);
            Err(PageError::Js("gtag threw".to_string()))
        }
    }

    #[test]
    fn forwards_triples_in_order() {
        let sink = MemorySink::new();
        let tracker = Tracker::new(sink.clone());

        tracker.track("App Store", "Click", "Download Button");
        tracker.track("Navigation", "Scroll Click", "features");

        assert_eq!(
            sink.events(),
            vec![
                TrackedEvent::new("App Store", "Click", "Download Button"),
                TrackedEvent::new("Navigation", "Scroll Click", "features"),
            ]
        );
        assert_eq!(sink.count("App Store", "Click"), 1);
    }

    #[test]
    fn sink_failure_is_swallowed() {
        let attempts = Rc::new(Cell::new(0));
        let tracker = Tracker::new(BrokenSink {
            attempts: attempts.clone(),
        });

        tracker.track("Error", "JavaScript", "boom");
        tracker.track("Error", "JavaScript", "boom again");

        assert_eq!(attempts.get(), 2);
    }

    /// A page whose analytics global is described by the wrapped function.
    struct PageGlobal(fn() -> GlobalSlot<()>);

    impl AnalyticsSink for PageGlobal {
        fn send(&self, _event: &TrackedEvent) -> Result<(), PageError> {
            forward((self.0)(), |_| Err(PageError::Js("must not be called".to_string())))
        }
    }

    #[test]
    fn missing_or_non_callable_global_is_a_quiet_no_op() {
        let called = Cell::new(false);
        assert!(forward(GlobalSlot::<()>::Absent, |_| {
            called.set(true);
            Ok(())
        })
        .is_ok());
        assert!(forward(GlobalSlot::<()>::NotCallable, |_| {
            called.set(true);
            Ok(())
        })
        .is_ok());
        assert!(!called.get());

        let tracker = Tracker::new(PageGlobal(|| GlobalSlot::Absent));
        tracker.track("App Store", "Click", "Download Button");
        let tracker = Tracker::new(PageGlobal(|| GlobalSlot::NotCallable));
        tracker.track("App Store", "Hover", "Download Button");
    }

    #[test]
    fn callable_global_receives_the_event() {
        let event = TrackedEvent::new("Scroll", "Depth", "50%");
        let mut seen = None;
        forward(GlobalSlot::Callable("gtag"), |name| {
            seen = Some(format!("{}({})", name, event));
            Ok(())
        })
        .unwrap();
        assert_eq!(seen.as_deref(), Some("gtag(Scroll - Depth - 50%)"));
    }

    #[test]
    fn display_matches_diagnostic_format() {
        let event = TrackedEvent::new("Scroll", "Depth", "25%");
        assert_eq!(event.to_string(), "Scroll - Depth - 25%");
    }
}
