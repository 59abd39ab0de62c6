//! Composition root of the gallery core.
//!
//! `GalleryViewer` owns one viewer session and keeps the page index, the zoom
//! state, the bar offsets and the backdrop opacity in agreement as gesture
//! and scroll events arrive from the host.

use std::fmt;
use std::ops::Range;
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, info, trace};

use super::bars::BarsAnimation;
use super::index_tracker::{IndexObserver, IndexTracker};
use super::item_gesture::{ItemEvent, ItemProps};
use super::overlay::{BarContent, BarRenderer, BarSlot};
use super::paging::{resident_range, PageLayout, PagerHandle, RESIDENT_RADIUS};
use super::request_close::{CloseCallback, RequestClose};
use crate::animation::Interpolation;
use crate::config::ViewerConfig;
use crate::models::{ImageSource, SessionPhase, ViewerSession};

/// Vertical drag distance at which the backdrop reaches its dimmest.
pub const DRAG_FADE_DISTANCE: f64 = 75.0;
/// Backdrop opacity at or beyond `DRAG_FADE_DISTANCE`.
pub const DRAG_MIN_OPACITY: f64 = 0.7;

type LongPressCallback = Rc<dyn Fn(&ImageSource)>;

/// Why a close was requested. Every intent goes through the same guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseIntent {
    BackdropTap,
    BackButton,
    SwipeComplete,
    DismissEnd,
    HeaderButton,
    ItemDismiss,
}

pub struct GalleryViewer {
    config: ViewerConfig,
    images: Vec<ImageSource>,
    phase: SessionPhase,
    start_index: usize,
    index: IndexTracker,
    bars: BarsAnimation,
    close: RequestClose,
    is_zoomed: bool,
    vertical_offset: f64,
    drag_opacity: Interpolation,
    scroll_enabled: bool,
    pager: Option<Box<dyn PagerHandle>>,
    header: BarRenderer,
    footer: BarRenderer,
    on_long_press: Option<LongPressCallback>,
}

impl fmt::Debug for GalleryViewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GalleryViewer")
            .field("phase", &self.phase)
            .field("image_count", &self.images.len())
            .field("index", &self.index)
            .field("is_zoomed", &self.is_zoomed)
            .field("vertical_offset", &self.vertical_offset)
            .field("scroll_enabled", &self.scroll_enabled)
            .field("header", &self.header)
            .field("footer", &self.footer)
            .finish()
    }
}

impl GalleryViewer {
    pub fn builder(images: Vec<ImageSource>) -> GalleryViewerBuilder {
        GalleryViewerBuilder::new(images)
    }

    // ---- session lifecycle ----

    /// Drive the session from the host's visibility flag.
    ///
    /// Becoming visible, or being presented again with a different starting
    /// index, starts a fresh session. Hiding ends the current one.
    pub fn set_visible(&mut self, visible: bool, start_index: usize) {
        match (self.phase, visible) {
            (SessionPhase::Hidden, true) => self.start_session(start_index),
            (SessionPhase::Visible | SessionPhase::Closing, true) => {
                if start_index != self.start_index {
                    debug!(
                        previous = self.start_index,
                        start_index, "Starting index changed, recreating session"
                    );
                    self.start_session(start_index);
                }
            }
            (SessionPhase::Visible | SessionPhase::Closing, false) => {
                info!(index = self.index.current(), "Viewer hidden");
                self.phase = SessionPhase::Hidden;
            }
            (SessionPhase::Hidden, false) => {}
        }
    }

    fn start_session(&mut self, start_index: usize) {
        self.start_index = start_index;
        self.index.reset(start_index);
        self.close.reset();
        self.bars.reset();
        self.vertical_offset = 0.0;
        self.is_zoomed = false;
        self.set_scroll_enabled(true);
        self.phase = SessionPhase::Visible;
        info!(
            index = self.index.current(),
            image_count = self.images.len(),
            "Viewer presented"
        );
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn session(&self) -> ViewerSession {
        ViewerSession {
            phase: self.phase,
            current_index: self.index.current(),
            is_zoomed: self.is_zoomed,
            vertical_offset: self.vertical_offset,
            is_closing: self.close.is_closing(),
        }
    }

    // ---- input from the list and the active page ----

    /// Horizontal paging came to rest at `offset_x`.
    pub fn on_settle(&mut self, offset_x: f64) -> Option<usize> {
        if self.phase != SessionPhase::Visible {
            trace!(phase = ?self.phase, offset_x, "Settle outside visible session");
            return None;
        }
        self.index.settle(offset_x)
    }

    /// The active page crossed between base scale and magnified.
    pub fn on_zoom_change(&mut self, is_scaled: bool, now: Instant) {
        if self.phase != SessionPhase::Visible {
            trace!(phase = ?self.phase, is_scaled, "Zoom change outside visible session");
            return;
        }
        if is_scaled == self.is_zoomed {
            return;
        }
        debug!(is_scaled, "Zoom state changed");
        self.is_zoomed = is_scaled;
        self.set_scroll_enabled(!is_scaled);
        self.bars.set_visible(!is_scaled, now);
    }

    /// Latest vertical drag offset of the active page, in pixels.
    pub fn on_vertical_offset_change(&mut self, offset_y: f64) {
        if !self.phase.is_shown() {
            return;
        }
        self.vertical_offset = if offset_y.is_finite() { offset_y } else { 0.0 };
    }

    pub fn request_close(&mut self, intent: CloseIntent, now: Instant) -> bool {
        if self.phase != SessionPhase::Visible {
            debug!(?intent, phase = ?self.phase, "Close request ignored");
            return false;
        }
        info!(?intent, index = self.index.current(), "Close requested");
        let started = self.close.request(now);
        if started {
            self.phase = SessionPhase::Closing;
        }
        started
    }

    /// Dispatch an event reported by the page at `index`.
    pub fn handle_item_event(&mut self, index: usize, event: ItemEvent, now: Instant) {
        match event {
            ItemEvent::ZoomChanged(is_scaled) => self.on_zoom_change(is_scaled, now),
            ItemEvent::OffsetYChanged(offset_y) => self.on_vertical_offset_change(offset_y),
            ItemEvent::RequestClose => {
                self.request_close(CloseIntent::ItemDismiss, now);
            }
            ItemEvent::LongPress => {
                if self.phase != SessionPhase::Visible {
                    return;
                }
                if let (Some(callback), Some(source)) =
                    (self.on_long_press.as_ref(), self.images.get(index))
                {
                    debug!(index, "Long press");
                    callback(source);
                }
            }
        }
    }

    /// Update the page dimension after a host resize. The committed index is kept.
    pub fn set_page_width(&mut self, page_width: f64) {
        self.index.set_page_width(page_width);
    }

    /// Attach the paginated list so zoom changes can lock its scrolling.
    pub fn attach_pager(&mut self, pager: Box<dyn PagerHandle>) {
        pager.set_scroll_enabled(self.scroll_enabled);
        self.pager = Some(pager);
    }

    fn set_scroll_enabled(&mut self, enabled: bool) {
        self.scroll_enabled = enabled;
        if let Some(ref pager) = self.pager {
            pager.set_scroll_enabled(enabled);
        }
    }

    // ---- derived state for the presentation layer ----

    pub fn images(&self) -> &[ImageSource] {
        &self.images
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn current_index(&self) -> usize {
        self.index.current()
    }

    pub fn current_image(&self) -> Option<&ImageSource> {
        self.images.get(self.index.current())
    }

    pub fn is_zoomed(&self) -> bool {
        self.is_zoomed
    }

    pub fn scroll_enabled(&self) -> bool {
        self.scroll_enabled
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn page_width(&self) -> f64 {
        self.index.page_width()
    }

    pub fn vertical_offset(&self) -> f64 {
        self.vertical_offset
    }

    /// Backdrop opacity from the dismiss drag alone.
    pub fn drag_opacity(&self) -> f64 {
        self.drag_opacity.map(self.vertical_offset)
    }

    /// Content opacity from the close fade alone.
    pub fn close_opacity(&self, now: Instant) -> f64 {
        self.close.opacity(now)
    }

    /// What the overlay tint should render this frame.
    pub fn backdrop_opacity(&self, now: Instant) -> f64 {
        self.drag_opacity() * self.close.opacity(now)
    }

    /// Downward translation of the content during a sliding close, given
    /// the viewport height. Zero unless the close animation slides.
    pub fn close_offset(&self, now: Instant, viewport_height: f64) -> f64 {
        self.close.slide_progress(now) * viewport_height.max(0.0)
    }

    /// Whether the close transition has finished and the host can hide.
    pub fn is_faded_out(&self, now: Instant) -> bool {
        self.close.is_faded_out(now)
    }

    pub fn header_offset(&self, now: Instant) -> f64 {
        self.bars.header_offset(now)
    }

    pub fn footer_offset(&self, now: Instant) -> f64 {
        self.bars.footer_offset(now)
    }

    pub fn bars_visible(&self) -> bool {
        self.bars.is_visible()
    }

    /// Whether any animation still needs frames.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.bars.is_animating(now) || (self.close.is_closing() && !self.close.is_faded_out(now))
    }

    pub fn header_content(&self) -> BarContent {
        self.header.render(BarSlot::Header, self.index.current())
    }

    pub fn footer_content(&self) -> BarContent {
        self.footer.render(BarSlot::Footer, self.index.current())
    }

    /// Gesture flags handed to every page.
    ///
    /// Swipe-to-close is always off while zoomed so a pan inside a magnified
    /// image can never dismiss the viewer.
    pub fn item_props(&self) -> ItemProps {
        let mut props = ItemProps::from(&self.config);
        if self.is_zoomed {
            props.swipe_to_close_enabled = false;
        }
        props
    }

    pub fn item_key(&self, index: usize) -> Option<String> {
        self.images.get(index).map(ImageSource::key)
    }

    pub fn page_layout(&self, index: usize) -> PageLayout {
        PageLayout::new(index, self.index.page_width())
    }

    /// Pages the list should keep mounted around the current one.
    pub fn resident_range(&self) -> Range<usize> {
        resident_range(self.index.current(), self.images.len(), RESIDENT_RADIUS)
    }

    /// Scroll offset the list should open at.
    pub fn initial_scroll_offset(&self) -> f64 {
        self.page_layout(self.index.current()).offset
    }
}

/// Builder for `GalleryViewer`.
pub struct GalleryViewerBuilder {
    images: Vec<ImageSource>,
    config: ViewerConfig,
    page_width: f64,
    header: BarRenderer,
    footer: BarRenderer,
    on_request_close: Option<CloseCallback>,
    on_index_change: Option<IndexObserver>,
    on_long_press: Option<LongPressCallback>,
}

impl GalleryViewerBuilder {
    fn new(images: Vec<ImageSource>) -> Self {
        Self {
            images,
            config: ViewerConfig::default(),
            page_width: 0.0,
            header: BarRenderer::Default,
            footer: BarRenderer::Default,
            on_request_close: None,
            on_index_change: None,
            on_long_press: None,
        }
    }

    pub fn config(mut self, config: ViewerConfig) -> Self {
        self.config = config;
        self
    }

    /// Width of one page, normally the viewport width.
    pub fn page_width(mut self, page_width: f64) -> Self {
        self.page_width = page_width;
        self
    }

    pub fn header(mut self, renderer: BarRenderer) -> Self {
        self.header = renderer;
        self
    }

    pub fn footer(mut self, renderer: BarRenderer) -> Self {
        self.footer = renderer;
        self
    }

    pub fn on_request_close<F: Fn() + 'static>(mut self, callback: F) -> Self {
        self.on_request_close = Some(Rc::new(callback));
        self
    }

    pub fn on_index_change<F: Fn(usize) + 'static>(mut self, callback: F) -> Self {
        self.on_index_change = Some(Rc::new(callback));
        self
    }

    pub fn on_long_press<F: Fn(&ImageSource) + 'static>(mut self, callback: F) -> Self {
        self.on_long_press = Some(Rc::new(callback));
        self
    }

    /// Build a hidden viewer; call `set_visible` to start a session.
    pub fn build(self) -> GalleryViewer {
        let mut index = IndexTracker::new(0, self.page_width, self.images.len());
        index.set_observer(self.on_index_change);
        let drag_opacity = Interpolation::tent(DRAG_FADE_DISTANCE, 1.0, DRAG_MIN_OPACITY);
        let close = RequestClose::with_animation(self.on_request_close, self.config.animation);

        GalleryViewer {
            config: self.config,
            start_index: 0,
            images: self.images,
            phase: SessionPhase::Hidden,
            index,
            bars: BarsAnimation::new(),
            close,
            is_zoomed: false,
            vertical_offset: 0.0,
            drag_opacity,
            scroll_enabled: true,
            pager: None,
            header: self.header,
            footer: self.footer,
            on_long_press: self.on_long_press,
        }
    }
}
