use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};
use web_sys::{Document, Window};

use crate::analytics::Tracker;
use crate::config::PageConfig;
use crate::error::Result;
use crate::page::dom;
use crate::page::scroll::{ScrollMetrics, ScrollWatcher};
use crate::page::{a11y, buttons, lifecycle, media, nav, reveal, scroll};

/// Owns the page's transient state and installs every behavior once the
/// document is ready.
#[derive(Debug)]
pub struct PageController {
    config: PageConfig,
    tracker: Tracker,
    scroll: Option<Rc<RefCell<ScrollWatcher>>>,
}

impl PageController {
    pub fn new(config: PageConfig, tracker: Tracker) -> Self {
        Self {
            config,
            tracker,
            scroll: None,
        }
    }

    pub fn from_config(config: PageConfig) -> Self {
        let tracker = Tracker::gtag(&config.analytics_function);
        Self::new(config, tracker)
    }

    /// Installs all behaviors. A behavior that fails to install is logged
    /// and skipped; only a missing window or document is an error.
    pub fn install(&mut self) -> Result<()> {
        let window = dom::window()?;
        let document = dom::document()?;
        let config = &self.config;
        let tracker = &self.tracker;

        report("navigation links", nav::install(&document, config, tracker));
        report("fade-in elements", reveal::install(&document, config));
        report("app store buttons", buttons::install(&document, config, tracker));

        if config.enhanced {
            report("lazy images", media::install_lazy_images(&document, config));
            let preloaded = media::install_preloads(&document, config);
            debug!("Preloaded {} critical image(s)", preloaded);
            report("skip link", a11y::install(&document, config));
        }

        match scroll::install(&window, &document, config, tracker) {
            Ok(watcher) => self.scroll = Some(watcher),
            Err(err) => warn!("Skipping scroll handling: {}", err),
        }

        if config.enhanced {
            report("lifecycle tracking", lifecycle::install(&window, &document, tracker));
        }

        self.sync_header(&window, &document);
        Ok(())
    }

    /// Applies the header state for the current position right away, so a
    /// page reloaded mid-scroll does not wait for the first scroll event.
    fn sync_header(&self, window: &Window, document: &Document) {
        if self.scroll.is_none() {
            return;
        }
        let metrics = ScrollMetrics::read(window, document);
        let scrolled = scroll::header_scrolled(metrics.scroll_y, self.config.scrolled_threshold_px);
        if let Ok(Some(header)) = dom::query_html(document, &self.config.header_selector) {
            dom::set_class(&header, &self.config.scrolled_class, scrolled);
        }
    }
}

fn report<T: std::fmt::Debug>(behavior: &str, result: Result<T>) {
    match result {
        Ok(outcome) => debug!("Installed {}: {:?}", behavior, outcome),
        Err(err) => warn!("Failed to install {}: {}", behavior, err),
    }
}

thread_local! {
    static ACTIVE: RefCell<Option<PageController>> = const { RefCell::new(None) };
}

/// Builds the controller, installs it and keeps it for the page lifetime.
/// Installing twice is a no-op.
pub fn boot(config: PageConfig) {
    if ACTIVE.with(|active| active.borrow().is_some()) {
        debug!("Landing page already initialized");
        return;
    }
    let mut controller = PageController::from_config(config);
    match controller.install() {
        Ok(()) => info!("Landing page initialized"),
        Err(err) => warn!("Landing page enhancements unavailable: {}", err),
    }
    ACTIVE.with(|active| *active.borrow_mut() = Some(controller));
}

/// Tracker of the running controller, if the page has booted.
pub fn active_tracker() -> Option<Tracker> {
    ACTIVE.with(|active| active.borrow().as_ref().map(|c| c.tracker.clone()))
}
