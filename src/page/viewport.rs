use web_sys::{Element, Window};

/// Bounding box in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Bounds {
    pub fn of(element: &Element) -> Self {
        let rect = element.get_bounding_client_rect();
        Self {
            top: rect.top(),
            left: rect.left(),
            bottom: rect.bottom(),
            right: rect.right(),
        }
    }

    /// True when the whole box lies inside a `width` x `height` viewport.
    pub fn fits_within(&self, width: f64, height: f64) -> bool {
        self.top >= 0.0 && self.left >= 0.0 && self.bottom <= height && self.right <= width
    }
}

/// Inner viewport size, falling back to the root element's client box.
pub fn viewport_size(window: &Window) -> (f64, f64) {
    let inner = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).filter(|v| *v > 0.0)
    };
    let root = window.document().and_then(|d| d.document_element());
    let width = inner(window.inner_width())
        .or_else(|| root.as_ref().map(|r| f64::from(r.client_width())))
        .unwrap_or(0.0);
    let height = inner(window.inner_height())
        .or_else(|| root.as_ref().map(|r| f64::from(r.client_height())))
        .unwrap_or(0.0);
    (width, height)
}
