use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use web_sys::{Document, Window};

use crate::analytics::Tracker;
use crate::config::PageConfig;
use crate::error::Result;
use crate::page::dom;
use crate::timing::{BrowserTimers, Debounce};

/// Scroll position snapshot taken when the debounced handler runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_y: f64,
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn read(window: &Window, document: &Document) -> Self {
        let scroll_y = window.scroll_y().unwrap_or(0.0);
        let (scroll_top, scroll_height, client_height) = document
            .document_element()
            .map(|root| {
                (
                    f64::from(root.scroll_top()),
                    f64::from(root.scroll_height()),
                    f64::from(root.client_height()),
                )
            })
            .unwrap_or((0.0, 0.0, 0.0));
        Self {
            scroll_y,
            // pageYOffset wins over the root's scrollTop, as browsers report it
            scroll_top: if scroll_y > 0.0 { scroll_y } else { scroll_top },
            scroll_height,
            client_height,
        }
    }

    pub fn percentage(&self) -> Option<f64> {
        scroll_percentage(self.scroll_top, self.scroll_height, self.client_height)
    }
}

/// How far down the page the viewport is, in percent. `None` when the
/// document is not taller than the viewport.
pub fn scroll_percentage(scroll_top: f64, scroll_height: f64, client_height: f64) -> Option<f64> {
    let scrollable = scroll_height - client_height;
    (scrollable > 0.0).then(|| scroll_top / scrollable * 100.0)
}

pub fn header_scrolled(scroll_y: f64, threshold_px: f64) -> bool {
    scroll_y > threshold_px
}

/// Scroll-depth milestones, each reported at most once per page lifetime.
#[derive(Debug, Clone)]
pub struct DepthMilestones {
    marks: Vec<(u8, bool)>,
}

impl DepthMilestones {
    pub fn new(thresholds: &[u8]) -> Self {
        Self {
            marks: thresholds.iter().map(|t| (*t, false)).collect(),
        }
    }

    /// Marks and returns every unreported milestone below `percentage`.
    pub fn crossed(&mut self, percentage: f64) -> Vec<u8> {
        self.marks
            .iter_mut()
            .filter(|(threshold, reported)| !*reported && percentage > f64::from(*threshold))
            .map(|(threshold, reported)| {
                *reported = true;
                *threshold
            })
            .collect()
    }
}

/// Controller-owned scroll state: the header flag and depth milestones.
#[derive(Debug)]
pub struct ScrollWatcher {
    threshold_px: f64,
    depth: Option<DepthMilestones>,
    tracker: Tracker,
}

impl ScrollWatcher {
    pub fn new(threshold_px: f64, depth: Option<DepthMilestones>, tracker: Tracker) -> Self {
        Self {
            threshold_px,
            depth,
            tracker,
        }
    }

    pub fn from_config(config: &PageConfig, tracker: Tracker) -> Self {
        let depth = config
            .enhanced
            .then(|| DepthMilestones::new(&config.depth_milestones));
        Self::new(config.scrolled_threshold_px, depth, tracker)
    }

    /// Returns whether the header should carry the scrolled state.
    pub fn update(&mut self, metrics: &ScrollMetrics) -> bool {
        if let (Some(depth), Some(percentage)) = (self.depth.as_mut(), metrics.percentage()) {
            for milestone in depth.crossed(percentage) {
                self.tracker.track("Scroll", "Depth", &format!("{}%", milestone));
            }
        }
        header_scrolled(metrics.scroll_y, self.threshold_px)
    }
}

pub fn install(
    window: &Window,
    document: &Document,
    config: &PageConfig,
    tracker: &Tracker,
) -> Result<Rc<RefCell<ScrollWatcher>>> {
    let watcher = Rc::new(RefCell::new(ScrollWatcher::from_config(config, tracker.clone())));

    let on_settled = {
        let watcher = Rc::clone(&watcher);
        let window = window.clone();
        let document = document.clone();
        let header_selector = config.header_selector.clone();
        let scrolled_class = config.scrolled_class.clone();
        move |()| {
            let metrics = ScrollMetrics::read(&window, &document);
            let scrolled = watcher.borrow_mut().update(&metrics);
            match dom::query_html(&document, &header_selector) {
                Ok(Some(header)) => {
                    dom::set_class(&header, &scrolled_class, scrolled);
                }
                _ => debug!("No `{}` element to mark as scrolled", header_selector),
            }
        }
    };

    let debounced = Debounce::new(BrowserTimers, config.scroll_debounce_ms, on_settled);
    dom::listen(window, "scroll", move |_: web_sys::Event| debounced.call(()))?;
    Ok(watcher)
}
