//! Resident-page maintenance for the gallery window.
//!
//! Pages live in a `gtk4::Stack`, one named child per mounted index. Only the
//! resident window around the current page is kept; everything else is
//! unmounted and its texture left to the LRU cache.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;

use gdk4::Texture;
use gtk4::prelude::*;
use gtk4::{ContentFit, Fixed, Picture, Stack, StackTransitionType};
use tracing::{debug, trace};

use lightbox::gallery::PagerHandle;

/// Fraction of the page width a horizontal drag must cover to flip pages.
pub const PAGE_FLIP_FRACTION: f64 = 0.2;

/// Scroll offset at which a horizontal drag of `dx` comes to rest.
///
/// Dragging left (`dx < 0`) moves toward the next page. The result is an
/// offset for the index tracker, which clamps to the valid page range.
pub fn settle_offset_for_drag(current: usize, page_width: f64, dx: f64) -> f64 {
    let base = current as f64 * page_width;
    if page_width <= 0.0 || !dx.is_finite() || dx.abs() < page_width * PAGE_FLIP_FRACTION {
        return base;
    }
    base - dx.signum() * page_width
}

/// Size of an image fitted inside a viewport ("contain"), then scaled.
pub fn fitted_size(image: (f64, f64), viewport: (f64, f64), scale: f64) -> (f64, f64) {
    let (img_w, img_h) = image;
    let (view_w, view_h) = viewport;
    if img_w <= 0.0 || img_h <= 0.0 || view_w <= 0.0 || view_h <= 0.0 {
        return (0.0, 0.0);
    }
    let fit = (view_w / img_w).min(view_h / img_h);
    (img_w * fit * scale, img_h * fit * scale)
}

/// Top-left position that centers `size` in `viewport`, then applies `pan`.
pub fn centered_position(size: (f64, f64), viewport: (f64, f64), pan: (f64, f64)) -> (f64, f64) {
    (
        (viewport.0 - size.0) / 2.0 + pan.0,
        (viewport.1 - size.1) / 2.0 + pan.1,
    )
}

/// Locks the pager while an image is zoomed.
///
/// The window consults `is_enabled` before turning a horizontal drag into a
/// page change.
#[derive(Debug, Clone)]
pub struct ScrollLock {
    enabled: Rc<Cell<bool>>,
}

impl ScrollLock {
    pub fn new() -> Self {
        Self {
            enabled: Rc::new(Cell::new(true)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }
}

impl Default for ScrollLock {
    fn default() -> Self {
        Self::new()
    }
}

impl PagerHandle for ScrollLock {
    fn set_scroll_enabled(&self, enabled: bool) {
        trace!(enabled, "Pager scroll");
        self.enabled.set(enabled);
    }
}

struct Page {
    key: String,
    fixed: Fixed,
    picture: Picture,
    image_size: Cell<Option<(f64, f64)>>,
}

fn page_name(index: usize) -> String {
    index.to_string()
}

/// Mounted pages keyed by image index.
pub struct PageStack {
    stack: Stack,
    pages: RefCell<HashMap<usize, Page>>,
    shown: Cell<Option<usize>>,
}

impl PageStack {
    pub fn new() -> Self {
        let stack = Stack::new();
        stack.set_hexpand(true);
        stack.set_vexpand(true);
        stack.set_transition_duration(200);
        stack.add_css_class("gallery-pages");

        Self {
            stack,
            pages: RefCell::new(HashMap::new()),
            shown: Cell::new(None),
        }
    }

    pub fn widget(&self) -> &Stack {
        &self.stack
    }

    pub fn is_mounted(&self, index: usize) -> bool {
        self.pages.borrow().contains_key(&index)
    }

    /// Mount `range`, unmount everything else. Returns the newly mounted
    /// indices so the caller can fill them.
    pub fn sync(&self, range: Range<usize>, key_for: impl Fn(usize) -> Option<String>) -> Vec<usize> {
        let mut pages = self.pages.borrow_mut();

        let stale: Vec<usize> = pages
            .iter()
            .filter(|(index, page)| !range.contains(*index) || key_for(**index).as_ref() != Some(&page.key))
            .map(|(index, _)| *index)
            .collect();
        for index in stale {
            if let Some(page) = pages.remove(&index) {
                self.stack.remove(&page.fixed);
                trace!(index, "Unmounted page");
            }
        }

        let mut mounted = Vec::new();
        for index in range {
            if pages.contains_key(&index) {
                continue;
            }
            let Some(key) = key_for(index) else {
                continue;
            };

            let fixed = Fixed::new();
            fixed.set_hexpand(true);
            fixed.set_vexpand(true);
            fixed.set_overflow(gtk4::Overflow::Hidden);

            let picture = Picture::new();
            picture.set_content_fit(ContentFit::Fill);
            picture.set_can_shrink(true);
            fixed.put(&picture, 0.0, 0.0);

            self.stack.add_named(&fixed, Some(&page_name(index)));
            pages.insert(
                index,
                Page {
                    key,
                    fixed,
                    picture,
                    image_size: Cell::new(None),
                },
            );
            mounted.push(index);
        }

        if !mounted.is_empty() {
            debug!(?mounted, "Mounted pages");
        }
        mounted
    }

    /// Show the page for `index`, sliding in the direction of travel.
    pub fn show(&self, index: usize) {
        if !self.is_mounted(index) || self.shown.get() == Some(index) {
            return;
        }
        let transition = match self.shown.get() {
            Some(previous) if previous < index => StackTransitionType::SlideLeft,
            Some(previous) if previous > index => StackTransitionType::SlideRight,
            _ => StackTransitionType::None,
        };
        self.stack.set_visible_child_full(&page_name(index), transition);
        self.shown.set(Some(index));
    }

    /// Install a decoded texture on every mounted page showing `key`.
    /// Returns whether any page took it.
    pub fn set_texture(&self, key: &str, texture: &Texture) -> bool {
        let pages = self.pages.borrow();
        let mut used = false;
        for page in pages.values().filter(|page| page.key == key) {
            page.picture.set_paintable(Some(texture));
            page.image_size
                .set(Some((texture.width() as f64, texture.height() as f64)));
            used = true;
        }
        used
    }

    pub fn has_texture(&self, index: usize) -> bool {
        self.pages
            .borrow()
            .get(&index)
            .is_some_and(|page| page.image_size.get().is_some())
    }

    /// Position the picture of page `index` for the given zoom, pan and
    /// vertical swipe offset.
    pub fn apply_transform(&self, index: usize, scale: f64, pan: (f64, f64), swipe_offset: f64) {
        let pages = self.pages.borrow();
        let Some(page) = pages.get(&index) else {
            return;
        };
        let Some(image) = page.image_size.get() else {
            return;
        };
        let viewport = (page.fixed.width() as f64, page.fixed.height() as f64);
        let size = fitted_size(image, viewport, scale);
        if size.0 <= 0.0 || size.1 <= 0.0 {
            return;
        }

        page.picture
            .set_size_request(size.0.round() as i32, size.1.round() as i32);
        let (x, y) = centered_position(size, viewport, (pan.0, pan.1 + swipe_offset));
        page.fixed.move_(&page.picture, x, y);
    }

    pub fn clear(&self) {
        let mut pages = self.pages.borrow_mut();
        for (_, page) in pages.drain() {
            self.stack.remove(&page.fixed);
        }
        self.shown.set(None);
    }
}

impl Default for PageStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_drag_stays_on_page() {
        assert_eq!(settle_offset_for_drag(2, 400.0, -50.0), 800.0);
        assert_eq!(settle_offset_for_drag(2, 400.0, 79.0), 800.0);
    }

    #[test]
    fn test_long_drag_flips_page() {
        assert_eq!(settle_offset_for_drag(2, 400.0, -120.0), 1200.0);
        assert_eq!(settle_offset_for_drag(2, 400.0, 120.0), 400.0);
        // Before the first page; the tracker clamps this to 0.
        assert_eq!(settle_offset_for_drag(0, 400.0, 200.0), -400.0);
    }

    #[test]
    fn test_drag_with_unknown_width() {
        assert_eq!(settle_offset_for_drag(3, 0.0, -500.0), 0.0);
    }

    #[test]
    fn test_fitted_size_contains() {
        assert_eq!(fitted_size((200.0, 100.0), (400.0, 400.0), 1.0), (400.0, 200.0));
        assert_eq!(fitted_size((100.0, 200.0), (400.0, 400.0), 2.0), (400.0, 800.0));
        assert_eq!(fitted_size((0.0, 200.0), (400.0, 400.0), 1.0), (0.0, 0.0));
    }

    #[test]
    fn test_centered_position() {
        assert_eq!(
            centered_position((400.0, 200.0), (400.0, 400.0), (0.0, 0.0)),
            (0.0, 100.0)
        );
        assert_eq!(
            centered_position((400.0, 200.0), (400.0, 400.0), (10.0, -30.0)),
            (10.0, 70.0)
        );
    }

    #[test]
    fn test_scroll_lock() {
        let lock = ScrollLock::new();
        let handle: Box<dyn PagerHandle> = Box::new(lock.clone());
        handle.set_scroll_enabled(false);
        assert!(!lock.is_enabled());
        handle.set_scroll_enabled(true);
        assert!(lock.is_enabled());
    }
}
