use log::{warn, Level};
use serde::Deserialize;
use wasm_bindgen::JsValue;
use web_sys::{js_sys, Window};

use crate::error::PageError;

/// Global the host page may define to override [`PageConfig`] defaults.
pub const CONFIG_GLOBAL: &str = "LANDING_CONFIG";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose while developing locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    /// Turns on the loading pulse, keyboard activation, depth milestones,
    /// lifecycle tracking, lazy images, preloading and the skip link.
    pub enhanced: bool,
    pub analytics_function: String,

    pub header_selector: String,
    pub anchor_selector: String,
    pub scrolled_class: String,
    pub scrolled_threshold_px: f64,
    pub scroll_debounce_ms: u32,
    pub depth_milestones: Vec<u8>,

    pub fade_selector: String,
    pub visible_class: String,
    pub fade_threshold: f64,
    pub fade_root_margin: String,

    pub button_selector: String,
    pub loading_class: String,
    pub loading_ms: u32,

    pub lazy_image_selector: String,
    pub preload_images: Vec<String>,

    pub skip_link_target: String,
    pub skip_link_text: String,
    pub skip_link_class: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            enhanced: true,
            analytics_function: "gtag".to_string(),
            header_selector: "header".to_string(),
            anchor_selector: "a[href^=\"#\"]".to_string(),
            scrolled_class: "scrolled".to_string(),
            scrolled_threshold_px: 50.0,
            scroll_debounce_ms: 100,
            depth_milestones: vec![25, 50, 75],
            fade_selector: ".fade-in".to_string(),
            visible_class: "visible".to_string(),
            fade_threshold: 0.1,
            fade_root_margin: "0px 0px -50px 0px".to_string(),
            button_selector: ".app-store-btn, .app-store-btn-white".to_string(),
            loading_class: "loading".to_string(),
            loading_ms: 200,
            lazy_image_selector: "img[data-src]".to_string(),
            preload_images: vec![
                "./assets/hero-mockup.png".to_string(),
                "./assets/logo.png".to_string(),
            ],
            skip_link_target: "main-content".to_string(),
            skip_link_text: "Skip to main content".to_string(),
            skip_link_class: "sr-only focus:not-sr-only fixed top-0 left-0 z-50 bg-primary text-white px-4 py-2 transform -translate-y-full focus:translate-y-0 transition-transform".to_string(),
        }
    }
}

impl PageConfig {
    /// Reads the override object from `window.LANDING_CONFIG`, if any.
    pub fn from_window(window: &Window) -> Result<Self, PageError> {
        let raw = js_sys::Reflect::get(window, &JsValue::from_str(CONFIG_GLOBAL))?;
        if raw.is_undefined() || raw.is_null() {
            return Ok(Self::default());
        }
        let config: PageConfig = serde_wasm_bindgen::from_value(raw)
            .map_err(|e| PageError::Config(e.to_string()))?;
        config.validated()
    }

    /// Like [`PageConfig::from_window`] but never fails.
    pub fn load_or_default(window: &Window) -> Self {
        match Self::from_window(window) {
            Ok(config) => config,
            Err(err) => {
                warn!("Ignoring {}: {}", CONFIG_GLOBAL, err);
                Self::default()
            }
        }
    }

    pub fn validated(mut self) -> Result<Self, PageError> {
        if !(0.0..=1.0).contains(&self.fade_threshold) {
            return Err(PageError::Config(format!(
                "fadeThreshold must be within 0..=1, got {}",
                self.fade_threshold
            )));
        }
        if let Some(bad) = self.depth_milestones.iter().find(|m| **m > 100) {
            return Err(PageError::Config(format!(
                "depth milestone {}% is above 100%",
                bad
            )));
        }
        self.depth_milestones.sort_unstable();
        self.depth_milestones.dedup();
        Ok(self)
    }

    pub fn skip_link_href(&self) -> String {
        format!("#{}", self.skip_link_target)
    }

    /// Loading window for CTA buttons; only the richer variant shows it.
    pub fn loading_window_ms(&self) -> Option<u32> {
        self.enhanced.then_some(self.loading_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_page_contract() {
        let config = PageConfig::default();
        assert!(config.enhanced);
        assert_eq!(config.scroll_debounce_ms, 100);
        assert_eq!(config.loading_ms, 200);
        assert_eq!(config.scrolled_threshold_px, 50.0);
        assert_eq!(config.depth_milestones, vec![25, 50, 75]);
        assert_eq!(config.fade_root_margin, "0px 0px -50px 0px");
        assert_eq!(config.skip_link_href(), "#main-content");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config: PageConfig = serde_json::from_str(
            r#"{ "enhanced": false, "analyticsFunction": "dataLayerPush", "loadingMs": 500 }"#,
        )
        .unwrap();
        assert!(!config.enhanced);
        assert_eq!(config.analytics_function, "dataLayerPush");
        assert_eq!(config.loading_ms, 500);
        assert_eq!(config.header_selector, "header");
        assert_eq!(config.loading_window_ms(), None);
    }

    #[test]
    fn validation_sorts_milestones_and_rejects_bad_values() {
        let config = PageConfig {
            depth_milestones: vec![75, 25, 50, 25],
            ..PageConfig::default()
        }
        .validated()
        .unwrap();
        assert_eq!(config.depth_milestones, vec![25, 50, 75]);

        let err = PageConfig {
            depth_milestones: vec![150],
            ..PageConfig::default()
        }
        .validated()
        .unwrap_err();
        assert!(matches!(err, PageError::Config(_)));

        let err = PageConfig {
            fade_threshold: 1.5,
            ..PageConfig::default()
        }
        .validated()
        .unwrap_err();
        assert!(err.to_string().contains("fadeThreshold"));
    }
}
