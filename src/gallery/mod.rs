//! Gesture and animation coordination for the full-screen gallery.
//!
//! This module provides:
//! - `RequestClose` - Idempotent close guard with a fade-out opacity
//! - `IndexTracker` - Committed page index from settle offsets
//! - `BarsAnimation` - Header/footer slide offsets
//! - `ItemGesture` - Per-page pinch, pan, double-tap and dismiss recognizer
//! - `GalleryViewer` - The composition root the host talks to

pub mod bars;
pub mod index_tracker;
pub mod item_gesture;
pub mod overlay;
pub mod paging;
pub mod request_close;
pub mod viewer;

pub use bars::BarsAnimation;
pub use index_tracker::IndexTracker;
pub use item_gesture::{DragAxis, ItemEvent, ItemGesture, ItemProps};
pub use overlay::{BarContent, BarRenderer, BarSlot};
pub use paging::{PageLayout, PagerHandle};
pub use request_close::RequestClose;
pub use viewer::{CloseIntent, GalleryViewer, GalleryViewerBuilder};
