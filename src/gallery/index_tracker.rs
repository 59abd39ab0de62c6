use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace, warn};

pub type IndexObserver = Rc<dyn Fn(usize)>;

/// Commits the visible page index from horizontal settle offsets.
///
/// Intermediate scroll frames never reach the tracker; only settle events do,
/// so index-dependent overlays do not flicker while a page is in motion.
pub struct IndexTracker {
    current: usize,
    page_width: f64,
    item_count: usize,
    observer: Option<IndexObserver>,
}

impl fmt::Debug for IndexTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexTracker")
            .field("current", &self.current)
            .field("page_width", &self.page_width)
            .field("item_count", &self.item_count)
            .field("observer", &self.observer.as_ref().map(|_| "<closure>"))
            .finish()
    }
}

impl IndexTracker {
    pub fn new(start_index: usize, page_width: f64, item_count: usize) -> Self {
        Self {
            current: clamp_index(start_index, item_count),
            page_width,
            item_count,
            observer: None,
        }
    }

    /// Register the observer notified on every committed change.
    pub fn set_observer(&mut self, observer: Option<IndexObserver>) {
        self.observer = observer;
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn page_width(&self) -> f64 {
        self.page_width
    }

    pub fn set_page_width(&mut self, page_width: f64) {
        self.page_width = page_width;
    }

    /// Compute the page index an offset settles on, without committing it.
    pub fn index_for_offset(&self, offset_x: f64) -> Option<usize> {
        if self.item_count == 0 {
            return None;
        }
        if !(self.page_width.is_finite() && self.page_width > 0.0) || !offset_x.is_finite() {
            return None;
        }
        let raw = (offset_x / self.page_width).round();
        if raw <= 0.0 {
            return Some(0);
        }
        Some((raw as usize).min(self.item_count - 1))
    }

    /// Handle a settle event. Returns the new index if it changed.
    pub fn settle(&mut self, offset_x: f64) -> Option<usize> {
        let Some(next) = self.index_for_offset(offset_x) else {
            warn!(
                offset_x,
                page_width = self.page_width,
                item_count = self.item_count,
                "Ignoring settle event"
            );
            return None;
        };
        if next == self.current {
            trace!(index = next, "Settled on current page");
            return None;
        }
        debug!(from = self.current, to = next, "Page index committed");
        self.current = next;
        if let Some(ref observer) = self.observer {
            observer(next);
        }
        Some(next)
    }

    /// Set the index directly, bypassing the observer.
    pub fn reset(&mut self, start_index: usize) {
        self.current = clamp_index(start_index, self.item_count);
    }
}

/// Clamp an index into `[0, count - 1]`; an empty list pins it to 0.
pub fn clamp_index(index: usize, count: usize) -> usize {
    index.min(count.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recording(tracker: &mut IndexTracker) -> Rc<RefCell<Vec<usize>>> {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = calls.clone();
        tracker.set_observer(Some(Rc::new(move |i| sink.borrow_mut().push(i))));
        calls
    }

    #[test]
    fn test_settle_rounds_offset() {
        let mut tracker = IndexTracker::new(0, 400.0, 5);
        assert_eq!(tracker.settle(798.0), Some(2));
        assert_eq!(tracker.current(), 2);
    }

    #[test]
    fn test_settle_clamps_to_range() {
        let mut tracker = IndexTracker::new(2, 400.0, 5);
        assert_eq!(tracker.settle(-900.0), Some(0));
        assert_eq!(tracker.settle(100_000.0), Some(4));
    }

    #[test]
    fn test_observer_fires_once_per_distinct_index() {
        let mut tracker = IndexTracker::new(0, 400.0, 5);
        let calls = recording(&mut tracker);

        for offset in [0.0, 400.0, 400.0, 800.0] {
            tracker.settle(offset);
        }
        assert_eq!(*calls.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_initial_index_is_not_notified() {
        let mut tracker = IndexTracker::new(3, 400.0, 5);
        let calls = recording(&mut tracker);

        tracker.settle(1200.0);
        tracker.reset(1);
        assert!(calls.borrow().is_empty());
        assert_eq!(tracker.current(), 1);
    }

    #[test]
    fn test_out_of_range_start_is_clamped() {
        let tracker = IndexTracker::new(99, 400.0, 5);
        assert_eq!(tracker.current(), 4);
    }

    #[test]
    fn test_degenerate_inputs_are_ignored() {
        let mut empty = IndexTracker::new(0, 400.0, 0);
        assert_eq!(empty.settle(400.0), None);
        assert_eq!(empty.current(), 0);

        let mut zero_width = IndexTracker::new(1, 0.0, 5);
        assert_eq!(zero_width.settle(800.0), None);
        assert_eq!(zero_width.current(), 1);

        let mut tracker = IndexTracker::new(1, 400.0, 5);
        assert_eq!(tracker.settle(f64::NAN), None);
    }

    #[test]
    fn test_page_width_change_applies_to_later_settles() {
        let mut tracker = IndexTracker::new(0, 400.0, 5);
        tracker.set_page_width(200.0);
        assert_eq!(tracker.settle(410.0), Some(2));
    }
}
