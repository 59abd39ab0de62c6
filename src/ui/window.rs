// Gallery window for lightbox
// Full-screen overlay: paged images, sliding header/footer, swipe-to-dismiss

use gdk4::{Display, MemoryFormat, MemoryTexture, Texture};
use gtk4::graphene;
use gtk4::prelude::*;
use gtk4::{
    Align, Application, ApplicationWindow, Box as GtkBox, Button, CssProvider,
    EventControllerScroll, EventControllerScrollFlags, Fixed, GestureClick, GestureDrag,
    GestureLongPress, GestureZoom, Label, Orientation, Overlay, PickFlags, Settings, Widget,
    STYLE_PROVIDER_PRIORITY_APPLICATION,
};
use lru::LruCache;
use std::cell::{Cell, RefCell};
use std::num::NonZeroUsize;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use anyhow::Result;
use lightbox::config::Color;
use lightbox::gallery::item_gesture::MIN_SCALE;
use lightbox::gallery::{
    BarContent, BarRenderer, DragAxis, GalleryViewer, ItemEvent, ItemGesture,
};
use lightbox::models::SessionPhase;
use lightbox::scanner::ScanTarget;
use lightbox::{CloseIntent, ViewerConfig};

use super::keybindings::{GalleryAction, Keybindings};
use super::pager::{settle_offset_for_drag, PageStack, ScrollLock};
use crate::image_loader::{DecodedImage, ImageLoader, LoadOutcome};

/// Decoded textures kept around for quick paging back and forth.
const TEXTURE_CACHE_ENTRIES: usize = 8;
/// Longest side images are decoded to.
const DECODE_MAX_SIZE: u32 = 4096;
const DECODE_WORKERS: usize = 2;
/// GTK's default long-press time; the configured delay is expressed as a
/// factor of it.
const GTK_LONG_PRESS_TIME: Duration = Duration::from_millis(500);
const SCROLL_ZOOM_FACTOR: f64 = 0.1;
const SCROLL_DEADZONE: f64 = 0.01;

const BASE_CSS: &str = r#"
window.lightbox {
    background-color: transparent;
}

.gallery-bar {
    background-color: rgba(0, 0, 0, 0.55);
    color: #e0e0e0;
    padding: 8px 12px;
}

.gallery-bar button {
    background-color: transparent;
    border: 1px solid #555555;
    color: #e0e0e0;
}
"#;

/// Load the gallery stylesheet with the configured backdrop colour.
fn load_css(background: Color) {
    let provider = CssProvider::new();
    let css = format!(
        "{BASE_CSS}\n.gallery-backdrop {{\n    background-color: {};\n}}\n",
        background.to_css()
    );
    provider.load_from_string(&css);

    if let Some(display) = Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}

fn create_texture_from_rgba(image: DecodedImage) -> Option<Texture> {
    if image.width == 0 || image.height == 0 {
        return None;
    }
    let stride = image.width as usize * 4;
    if image.data.len() < stride * image.height as usize {
        tracing::warn!(
            "Skipping texture: data too small ({} bytes for {}x{})",
            image.data.len(),
            image.width,
            image.height
        );
        return None;
    }
    let bytes = glib::Bytes::from_owned(image.data);
    let texture = MemoryTexture::new(
        image.width as i32,
        image.height as i32,
        MemoryFormat::R8g8b8a8,
        &bytes,
        stride,
    );
    Some(texture.upcast())
}

/// What a primary click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClickTarget {
    /// Header or footer; their own widgets handle the click.
    Bar,
    Image,
    Backdrop,
}

impl ClickTarget {
    fn classify(on_bar: bool, on_image: bool) -> Self {
        if on_bar {
            ClickTarget::Bar
        } else if on_image {
            ClickTarget::Image
        } else {
            ClickTarget::Backdrop
        }
    }
}

/// Side effects raised by viewer callbacks, applied once the state borrow
/// is released.
#[derive(Debug, Clone, Copy, PartialEq)]
enum HostEffect {
    IndexChanged(usize),
    CloseRequested,
}

struct GalleryState {
    viewer: GalleryViewer,
    gesture: ItemGesture,
    textures: LruCache<String, Texture>,
    drag_axis: Option<DragAxis>,
    start_index: usize,
}

impl GalleryState {
    /// Route a per-item event to the viewer and push the resulting props
    /// back to the recognizer.
    fn dispatch(&mut self, event: Option<ItemEvent>, now: Instant) {
        let Some(event) = event else {
            return;
        };
        let index = self.viewer.current_index();
        self.viewer.handle_item_event(index, event, now);
        self.gesture.apply_props(self.viewer.item_props());
    }
}

struct BarWidgets {
    layer: Fixed,
    header: GtkBox,
    header_label: Label,
    close_button: Button,
    footer: GtkBox,
    footer_label: Label,
}

fn build_bars() -> BarWidgets {
    let layer = Fixed::new();
    layer.set_hexpand(true);
    layer.set_vexpand(true);

    let header = GtkBox::new(Orientation::Horizontal, 8);
    header.add_css_class("gallery-bar");
    let header_label = Label::new(None);
    header_label.set_hexpand(true);
    header_label.set_halign(Align::Start);
    let close_button = Button::with_label("[X] CLOSE");
    close_button.add_css_class("btn-primary");
    header.append(&header_label);
    header.append(&close_button);

    let footer = GtkBox::new(Orientation::Horizontal, 8);
    footer.add_css_class("gallery-bar");
    let footer_label = Label::new(None);
    footer_label.set_hexpand(true);
    footer_label.set_halign(Align::Start);
    footer_label.set_ellipsize(gtk4::pango::EllipsizeMode::Middle);
    footer.append(&footer_label);

    layer.put(&header, 0.0, 0.0);
    layer.put(&footer, 0.0, 0.0);

    BarWidgets {
        layer,
        header,
        header_label,
        close_button,
        footer,
        footer_label,
    }
}

fn apply_bar_content(bar: &GtkBox, label: &Label, content: &BarContent) {
    label.set_text(content.text.as_deref().unwrap_or(""));
    bar.set_visible(!content.is_empty());
}

/// Full-screen gallery window
pub struct GalleryWindow {
    self_weak: RefCell<Weak<GalleryWindow>>,
    window: ApplicationWindow,
    root: Overlay,
    pages: PageStack,
    scroll_lock: ScrollLock,
    bars: BarWidgets,
    keybindings: Keybindings,
    loader: ImageLoader,
    state: RefCell<GalleryState>,
    effects: Rc<RefCell<Vec<HostEffect>>>,
    last_width: Cell<i32>,
}

impl GalleryWindow {
    pub fn new(app: &Application, target: ScanTarget, config: ViewerConfig) -> Result<Rc<Self>> {
        load_css(config.background_color);
        if let Some(settings) = Settings::default() {
            settings.set_gtk_application_prefer_dark_theme(true);
        }

        let window = ApplicationWindow::builder()
            .application(app)
            .title("lightbox")
            .default_width(1200)
            .default_height(800)
            .build();
        if config.presentation.shows_presenter() {
            window.add_css_class("lightbox");
        }

        let pages = PageStack::new();
        let backdrop = GtkBox::new(Orientation::Vertical, 0);
        backdrop.add_css_class("gallery-backdrop");
        backdrop.append(pages.widget());

        let bars = build_bars();
        let root = Overlay::new();
        root.set_child(Some(&backdrop));
        root.add_overlay(&bars.layer);
        window.set_child(Some(&root));

        let effects: Rc<RefCell<Vec<HostEffect>>> = Rc::new(RefCell::new(Vec::new()));
        let names: Vec<String> = target.sources.iter().map(|s| s.display_name()).collect();
        let count = names.len();

        let close_effects = effects.clone();
        let index_effects = effects.clone();
        let mut viewer = GalleryViewer::builder(target.sources)
            .config(config.clone())
            .header(BarRenderer::custom(move |index| {
                BarContent::text(format!("{} / {}", index + 1, count)).with_close_button()
            }))
            .footer(BarRenderer::custom(move |index| {
                names
                    .get(index)
                    .map(|name| BarContent::text(name.clone()))
                    .unwrap_or_else(BarContent::empty)
            }))
            .on_request_close(move || close_effects.borrow_mut().push(HostEffect::CloseRequested))
            .on_index_change(move |index| {
                index_effects
                    .borrow_mut()
                    .push(HostEffect::IndexChanged(index))
            })
            .on_long_press(|source| tracing::info!("Long press on {}", source))
            .build();

        let scroll_lock = ScrollLock::new();
        viewer.attach_pager(Box::new(scroll_lock.clone()));
        let gesture = ItemGesture::new(viewer.item_props());

        let state = GalleryState {
            viewer,
            gesture,
            textures: LruCache::new(
                NonZeroUsize::new(TEXTURE_CACHE_ENTRIES).unwrap_or(NonZeroUsize::MIN),
            ),
            drag_axis: None,
            start_index: target.start_index,
        };

        let gallery = Rc::new(Self {
            self_weak: RefCell::new(Weak::new()),
            window,
            root,
            pages,
            scroll_lock,
            bars,
            keybindings: Keybindings::new(),
            loader: ImageLoader::new(DECODE_WORKERS)?,
            state: RefCell::new(state),
            effects,
            last_width: Cell::new(0),
        });
        *gallery.self_weak.borrow_mut() = Rc::downgrade(&gallery);

        gallery.setup_gestures(&config);
        gallery.setup_keyboard();
        gallery.setup_loader();
        gallery.setup_frame_clock();
        gallery.setup_close_handlers();

        Ok(gallery)
    }

    /// Start a session at the scanned start index and show the window.
    pub fn present(&self) {
        {
            let mut st = self.state.borrow_mut();
            let start = st.start_index;
            st.viewer.set_visible(true, start);
            tracing::info!(
                "Presenting gallery: {} images, starting at {}",
                st.viewer.image_count(),
                st.viewer.current_index()
            );
        }
        self.sync_pages();
        self.update_bar_content();
        let presentation = self.state.borrow().viewer.config().presentation;
        if presentation.covers_screen() {
            self.window.fullscreen();
        }
        self.window.present();
    }

    /// Current index and image count.
    fn position(&self) -> (usize, usize) {
        let st = self.state.borrow();
        (st.viewer.current_index(), st.viewer.image_count())
    }

    fn weak(&self) -> Weak<GalleryWindow> {
        self.self_weak.borrow().clone()
    }

    /// Run `f` against the gallery state, then apply queued effects.
    fn with_state<R>(&self, f: impl FnOnce(&mut GalleryState, Instant) -> R) -> R {
        let now = Instant::now();
        let result = {
            let mut st = self.state.borrow_mut();
            f(&mut st, now)
        };
        self.flush_effects();
        result
    }

    fn flush_effects(&self) {
        loop {
            let pending = std::mem::take(&mut *self.effects.borrow_mut());
            if pending.is_empty() {
                break;
            }
            for effect in pending {
                match effect {
                    HostEffect::IndexChanged(index) => self.on_index_changed(index),
                    HostEffect::CloseRequested => {
                        tracing::debug!("Close requested; fading out");
                    }
                }
            }
        }
        self.refresh_current_page();
    }

    fn on_index_changed(&self, index: usize) {
        tracing::debug!(index, "Current image changed");
        {
            let mut st = self.state.borrow_mut();
            let now = Instant::now();
            let event = st.gesture.reset();
            st.dispatch(event, now);
        }
        self.sync_pages();
        self.update_bar_content();
    }

    /// Mount the resident pages, fill them from the cache and queue decodes
    /// for the rest.
    fn sync_pages(&self) {
        let mut st = self.state.borrow_mut();
        let range = st.viewer.resident_range();
        let current = st.viewer.current_index();
        {
            let viewer = &st.viewer;
            self.pages.sync(range.clone(), |index| viewer.item_key(index));
        }

        // Current page first so it decodes ahead of its neighbours.
        let order = std::iter::once(current).chain(range.filter(move |i| *i != current));
        for index in order {
            if self.pages.has_texture(index) {
                continue;
            }
            let Some(source) = st.viewer.images().get(index).cloned() else {
                continue;
            };
            let key = source.key();
            if let Some(texture) = st.textures.get(&key) {
                self.pages.set_texture(&key, texture);
            } else if !self.loader.request(source, DECODE_MAX_SIZE) {
                tracing::warn!("Decode queue full, skipping {}", key);
            }
        }

        if st.viewer.image_count() > 0 {
            self.pages.show(current);
        }
    }

    fn update_bar_content(&self) {
        let st = self.state.borrow();
        let header = st.viewer.header_content();
        let footer = st.viewer.footer_content();
        apply_bar_content(&self.bars.header, &self.bars.header_label, &header);
        self.bars.close_button.set_visible(header.close_button);
        apply_bar_content(&self.bars.footer, &self.bars.footer_label, &footer);
    }

    fn refresh_current_page(&self) {
        let st = self.state.borrow();
        let index = st.viewer.current_index();
        let height = self.pages.widget().height() as f64;
        let offset_y =
            st.viewer.vertical_offset() + st.viewer.close_offset(Instant::now(), height);
        self.pages
            .apply_transform(index, st.gesture.scale(), st.gesture.pan(), offset_y);
    }

    fn handle_load_outcome(&self, outcome: LoadOutcome) {
        match outcome {
            LoadOutcome::Loaded(image) => {
                let key = image.key.clone();
                let Some(texture) = create_texture_from_rgba(image) else {
                    return;
                };
                self.state.borrow_mut().textures.put(key.clone(), texture.clone());
                if self.pages.set_texture(&key, &texture) {
                    self.refresh_current_page();
                }
            }
            LoadOutcome::Failed { key, error } => {
                tracing::warn!("Failed to load {}: {}", key, error);
            }
        }
    }

    fn handle_action(&self, action: GalleryAction) {
        let (current, count) = self.position();
        if let Some(target) = action.target_page(current, count) {
            if !self.scroll_lock.is_enabled() {
                return;
            }
            self.with_state(|st, _now| {
                let offset = target as f64 * st.viewer.page_width();
                st.viewer.on_settle(offset);
            });
            return;
        }

        match action {
            GalleryAction::Close => {
                self.with_state(|st, now| st.viewer.request_close(CloseIntent::BackButton, now));
            }
            GalleryAction::ResetZoom => self.with_state(|st, now| {
                let factor = MIN_SCALE / st.gesture.scale();
                let event = st.gesture.zoom_by(factor);
                st.dispatch(event, now);
            }),
            other => {
                if let Some(factor) = other.zoom_factor() {
                    self.with_state(|st, now| {
                        let event = st.gesture.zoom_by(factor);
                        st.dispatch(event, now);
                    });
                }
            }
        }
    }

    /// True if a click at `(x, y)` in root coordinates hit the current image.
    fn hits_image(&self, x: f64, y: f64) -> bool {
        let index = self.state.borrow().viewer.current_index();
        let Some(child) = self.pages.widget().visible_child() else {
            return false;
        };
        let Some(picture) = child.first_child() else {
            return false;
        };
        let Some(point) = self
            .root
            .compute_point(&picture, &graphene::Point::new(x as f32, y as f32))
        else {
            return false;
        };
        let inside = point.x() >= 0.0
            && point.y() >= 0.0
            && point.x() <= picture.width() as f32
            && point.y() <= picture.height() as f32;
        tracing::trace!(index, inside, "Click hit test");
        inside
    }

    /// True if `(x, y)` in root coordinates lands on the header or footer.
    fn hits_bar(&self, x: f64, y: f64) -> bool {
        let Some(target) = self.root.pick(x, y, PickFlags::DEFAULT) else {
            return false;
        };
        [&self.bars.header, &self.bars.footer].into_iter().any(|bar| {
            target == *bar.upcast_ref::<Widget>() || target.is_ancestor(bar)
        })
    }

    fn setup_gestures(&self, config: &ViewerConfig) {
        // Pinch
        let zoom_gesture = GestureZoom::new();
        let weak = self.weak();
        zoom_gesture.connect_begin(move |_, _sequence| {
            if let Some(gallery) = weak.upgrade() {
                gallery.state.borrow_mut().gesture.pinch_begin();
            }
        });
        let weak = self.weak();
        zoom_gesture.connect_scale_changed(move |_, scale| {
            if let Some(gallery) = weak.upgrade() {
                gallery.with_state(|st, now| {
                    let event = st.gesture.pinch_update(scale);
                    st.dispatch(event, now);
                });
            }
        });
        self.root.add_controller(zoom_gesture);

        // Drag: pan when zoomed, vertical swipe-to-close, horizontal paging
        let drag_gesture = GestureDrag::new();
        drag_gesture.set_button(1);
        let weak = self.weak();
        drag_gesture.connect_drag_begin(move |_, _x, _y| {
            if let Some(gallery) = weak.upgrade() {
                let mut st = gallery.state.borrow_mut();
                st.gesture.drag_begin(Instant::now());
                st.drag_axis = None;
            }
        });
        let weak = self.weak();
        drag_gesture.connect_drag_update(move |_, offset_x, offset_y| {
            if let Some(gallery) = weak.upgrade() {
                gallery.with_state(|st, now| {
                    let event = st.gesture.drag_update(offset_x, offset_y);
                    st.drag_axis = st.gesture.drag_axis();
                    st.dispatch(event, now);
                });
            }
        });
        let weak = self.weak();
        drag_gesture.connect_drag_end(move |_, offset_x, offset_y| {
            if let Some(gallery) = weak.upgrade() {
                let paging = gallery.scroll_lock.is_enabled();
                gallery.with_state(|st, now| {
                    let axis = st.drag_axis.take();
                    let event = st.gesture.drag_end(offset_x, offset_y, now);
                    st.dispatch(event, now);
                    if paging && axis == Some(DragAxis::Horizontal) {
                        let offset = settle_offset_for_drag(
                            st.viewer.current_index(),
                            st.viewer.page_width(),
                            offset_x,
                        );
                        st.viewer.on_settle(offset);
                    }
                });
            }
        });
        self.root.add_controller(drag_gesture);

        // Taps: double tap zooms, a tap outside the image closes
        let click = GestureClick::new();
        click.set_button(1);
        let weak = self.weak();
        click.connect_released(move |_, n_press, x, y| {
            if let Some(gallery) = weak.upgrade() {
                let target =
                    ClickTarget::classify(gallery.hits_bar(x, y), gallery.hits_image(x, y));
                gallery.with_state(|st, now| match target {
                    ClickTarget::Bar => {}
                    ClickTarget::Image => {
                        let event = st.gesture.tap(now);
                        st.dispatch(event, now);
                    }
                    ClickTarget::Backdrop => {
                        if n_press == 1 && !st.gesture.is_zoomed() {
                            st.viewer.request_close(CloseIntent::BackdropTap, now);
                        }
                    }
                });
            }
        });
        self.root.add_controller(click);

        let long_press = GestureLongPress::new();
        long_press.set_delay_factor(
            config.long_press_delay.as_secs_f64() / GTK_LONG_PRESS_TIME.as_secs_f64(),
        );
        let weak = self.weak();
        long_press.connect_pressed(move |_, _x, _y| {
            if let Some(gallery) = weak.upgrade() {
                gallery.with_state(|st, now| {
                    let event = st.gesture.long_press();
                    st.dispatch(event, now);
                });
            }
        });
        self.root.add_controller(long_press);

        let scroll_controller = EventControllerScroll::new(EventControllerScrollFlags::VERTICAL);
        let weak = self.weak();
        scroll_controller.connect_scroll(move |_, _dx, dy| {
            if dy.abs() < SCROLL_DEADZONE {
                return glib::Propagation::Stop;
            }
            if let Some(gallery) = weak.upgrade() {
                let factor = (1.0 + SCROLL_ZOOM_FACTOR).powf(-dy);
                gallery.with_state(|st, now| {
                    let event = st.gesture.zoom_by(factor);
                    st.dispatch(event, now);
                });
            }
            glib::Propagation::Stop
        });
        self.root.add_controller(scroll_controller);

        let weak = self.weak();
        self.bars.close_button.connect_clicked(move |_| {
            if let Some(gallery) = weak.upgrade() {
                gallery.with_state(|st, now| {
                    st.viewer.request_close(CloseIntent::HeaderButton, now)
                });
            }
        });
    }

    fn setup_keyboard(&self) {
        let weak = self.weak();
        self.keybindings.connect_action(move |action| {
            if let Some(gallery) = weak.upgrade() {
                gallery.handle_action(action);
            }
        });
        self.keybindings.attach(&self.window);
    }

    fn setup_loader(&self) {
        let receiver = self.loader.results();
        let weak = self.weak();
        glib::spawn_future_local(async move {
            while let Ok(outcome) = receiver.recv().await {
                if let Some(gallery) = weak.upgrade() {
                    gallery.handle_load_outcome(outcome);
                } else {
                    break;
                }
            }
        });
    }

    /// Sample the animated values once per frame.
    fn setup_frame_clock(&self) {
        let weak = self.weak();
        self.window.add_tick_callback(move |_, _clock| {
            let Some(gallery) = weak.upgrade() else {
                return glib::ControlFlow::Break;
            };
            if gallery.on_frame(Instant::now()) {
                gallery.window.close();
            }
            glib::ControlFlow::Continue
        });
    }

    /// Apply one frame. Returns true once the close fade has finished.
    fn on_frame(&self, now: Instant) -> bool {
        if self.state.borrow().viewer.phase() == SessionPhase::Closing {
            self.refresh_current_page();
        }
        let width = self.pages.widget().width();
        if width > 0 && width != self.last_width.get() {
            self.last_width.set(width);
            self.state.borrow_mut().viewer.set_page_width(width as f64);
            self.bars.header.set_size_request(width, -1);
            self.bars.footer.set_size_request(width, -1);
            self.refresh_current_page();
        }

        let st = self.state.borrow();
        self.root.set_opacity(st.viewer.backdrop_opacity(now));

        let layer_height = self.bars.layer.height() as f64;
        let footer_height = self.bars.footer.height() as f64;
        self.bars
            .layer
            .move_(&self.bars.header, 0.0, st.viewer.header_offset(now));
        self.bars.layer.move_(
            &self.bars.footer,
            0.0,
            layer_height - footer_height + st.viewer.footer_offset(now),
        );

        st.viewer.phase() == SessionPhase::Closing && st.viewer.is_faded_out(now)
    }

    fn setup_close_handlers(&self) {
        let Some(gallery) = self.self_weak.borrow().upgrade() else {
            return;
        };
        // The handler owns the window's strong reference; it is released
        // when GTK disposes the window.
        self.window.connect_close_request(move |_| {
            gallery.on_window_closed();
            glib::Propagation::Proceed
        });
    }

    fn on_window_closed(&self) {
        {
            let mut st = self.state.borrow_mut();
            let index = st.viewer.current_index();
            st.viewer.set_visible(false, index);
        }
        self.pages.clear();
        tracing::info!("Gallery closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_clicks_never_reach_backdrop() {
        assert_eq!(ClickTarget::classify(true, false), ClickTarget::Bar);
        assert_eq!(ClickTarget::classify(true, true), ClickTarget::Bar);
    }

    #[test]
    fn test_click_classification() {
        assert_eq!(ClickTarget::classify(false, true), ClickTarget::Image);
        assert_eq!(ClickTarget::classify(false, false), ClickTarget::Backdrop);
    }
}
