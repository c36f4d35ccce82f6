//! Lazy images and critical image preloading.

use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlImageElement};

use crate::config::PageConfig;
use crate::error::{PageError, Result};
use crate::page::dom::{self, ObserveOptions};

pub const DATA_SRC: &str = "data-src";

/// Source to swap in for a lazy image, if it has a usable one.
pub fn lazy_source(data_src: Option<String>) -> Option<String> {
    data_src
        .map(|src| src.trim().to_string())
        .filter(|src| !src.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadHint {
    pub href: String,
    pub as_type: &'static str,
}

pub fn preload_hints(paths: &[String]) -> Vec<PreloadHint> {
    paths
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(|p| PreloadHint {
            href: p.clone(),
            as_type: "image",
        })
        .collect()
}

pub fn install_lazy_images(document: &Document, config: &PageConfig) -> Result<usize> {
    let images = dom::query_all(document, &config.lazy_image_selector)?;
    let loading_class = config.loading_class.clone();
    dom::observe_once(images, &ObserveOptions::default(), move |element| {
        let Some(src) = lazy_source(element.get_attribute(DATA_SRC)) else {
            debug!("Lazy image without a {} value", DATA_SRC);
            return;
        };
        match element.dyn_ref::<HtmlImageElement>() {
            Some(img) => img.set_src(&src),
            None => {
                if let Err(err) = element.set_attribute("src", &src) {
                    debug!("Could not set lazy source {}: {:?}", src, err);
                }
            }
        }
        dom::set_class(element, &loading_class, false);
    })
}

fn append_preload(document: &Document, hint: &PreloadHint) -> Result<()> {
    let head = document
        .head()
        .ok_or_else(|| PageError::MissingElement("head".to_string()))?;
    let link = document.create_element("link")?;
    link.set_attribute("rel", "preload")?;
    link.set_attribute("href", &hint.href)?;
    link.set_attribute("as", hint.as_type)?;
    head.append_child(&link)?;
    Ok(())
}

/// Adds `<link rel="preload">` hints. One failed path does not stop the rest.
pub fn install_preloads(document: &Document, config: &PageConfig) -> usize {
    preload_hints(&config.preload_images)
        .iter()
        .filter(|hint| match append_preload(document, hint) {
            Ok(()) => true,
            Err(err) => {
                warn!("Failed to preload image {}: {}", hint.href, err);
                false
            }
        })
        .count()
}
