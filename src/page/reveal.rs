use web_sys::Document;

use crate::config::PageConfig;
use crate::error::Result;
use crate::page::dom::{self, ObserveOptions};

/// One-shot bookkeeping for observed elements, keyed by position.
/// An index moves from pending to revealed once and stays there.
#[derive(Debug, Clone)]
pub struct RevealTracker {
    revealed: Vec<bool>,
}

impl RevealTracker {
    pub fn new(len: usize) -> Self {
        Self {
            revealed: vec![false; len],
        }
    }

    /// Takes `(index, is_intersecting)` pairs and returns the indices that
    /// became visible for the first time, in entry order.
    pub fn on_entries(&mut self, entries: impl IntoIterator<Item = (usize, bool)>) -> Vec<usize> {
        let mut fresh = Vec::new();
        for (index, intersecting) in entries {
            if !intersecting {
                continue;
            }
            if let Some(seen) = self.revealed.get_mut(index) {
                if !*seen {
                    *seen = true;
                    fresh.push(index);
                }
            }
        }
        fresh
    }
}

pub fn install(document: &Document, config: &PageConfig) -> Result<usize> {
    let elements = dom::query_all(document, &config.fade_selector)?;
    let options = ObserveOptions {
        threshold: Some(config.fade_threshold),
        root_margin: Some(config.fade_root_margin.clone()),
    };
    let visible_class = config.visible_class.clone();
    let observed = dom::observe_once(elements, &options, move |element| {
        dom::set_class(element, &visible_class, true);
    })?;
    Ok(observed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_intersection_reveals_once() {
        let mut tracker = RevealTracker::new(3);

        assert_eq!(tracker.on_entries([(0, false), (1, true)]), vec![1]);
        assert_eq!(tracker.on_entries([(1, true), (1, true)]), Vec::<usize>::new());
        assert_eq!(tracker.on_entries([(0, true), (2, true)]), vec![0, 2]);
        assert!(tracker.on_entries([(0, true), (1, true), (2, true)]).is_empty());
    }

    #[test]
    fn leaving_the_viewport_never_hides() {
        let mut tracker = RevealTracker::new(1);
        assert_eq!(tracker.on_entries([(0, true)]), vec![0]);
        assert!(tracker.on_entries([(0, false)]).is_empty());
        assert!(tracker.on_entries([(0, true)]).is_empty());
    }

    #[test]
    fn unknown_indices_are_ignored() {
        let mut tracker = RevealTracker::new(1);
        assert!(tracker.on_entries([(4, true)]).is_empty());
        assert_eq!(tracker.on_entries([(0, true)]), vec![0]);
    }
}
