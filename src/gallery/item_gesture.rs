//! Per-page gesture recognizer: pinch/double-tap zoom, pan while zoomed and
//! vertical swipe-to-dismiss while unzoomed.
//!
//! The recognizer is fed raw gesture callbacks by the host and reports the
//! few things the viewer cares about as `ItemEvent`s.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::config::ViewerConfig;

/// Base scale; an image at this scale counts as unzoomed.
pub const MIN_SCALE: f64 = 1.0;
pub const MAX_SCALE: f64 = 10.0;
/// Scale a double tap zooms to.
pub const DOUBLE_TAP_SCALE: f64 = 2.0;
/// Maximum gap between two taps of a double tap.
pub const DOUBLE_TAP_DELAY: Duration = Duration::from_millis(300);
/// Movement before a drag commits to an axis.
pub const DRAG_SLOP: f64 = 10.0;
/// Vertical distance past which releasing a swipe dismisses the viewer.
pub const SWIPE_CLOSE_OFFSET: f64 = 75.0;
/// Release velocity (px/ms) past which a swipe dismisses the viewer.
pub const SWIPE_CLOSE_VELOCITY: f64 = 1.55;
const ZOOM_EPSILON: f64 = 1e-3;

/// What a page reports back to the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemEvent {
    /// The page crossed between base scale and magnified.
    ZoomChanged(bool),
    /// Vertical dismiss-drag offset, 0.0 when the drag springs back.
    OffsetYChanged(f64),
    LongPress,
    /// The page wants the viewer closed (completed dismiss swipe).
    RequestClose,
}

/// Flags the viewer hands to each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemProps {
    pub swipe_to_close_enabled: bool,
    pub double_tap_to_zoom_enabled: bool,
    pub long_press_delay: Duration,
}

impl From<&ViewerConfig> for ItemProps {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            swipe_to_close_enabled: config.swipe_to_close_enabled,
            double_tap_to_zoom_enabled: config.double_tap_to_zoom_enabled,
            long_press_delay: config.long_press_delay,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragAxis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone)]
pub struct ItemGesture {
    props: ItemProps,
    scale: f64,
    // Scale at pinch start; pinch updates are relative to this baseline.
    pinch_start_scale: f64,
    pan_x: f64,
    pan_y: f64,
    drag_start_pan: (f64, f64),
    drag_started_at: Option<Instant>,
    drag_axis: Option<DragAxis>,
    swipe_offset: f64,
    last_tap: Option<Instant>,
}

impl ItemGesture {
    pub fn new(props: ItemProps) -> Self {
        Self {
            props,
            scale: MIN_SCALE,
            pinch_start_scale: MIN_SCALE,
            pan_x: 0.0,
            pan_y: 0.0,
            drag_start_pan: (0.0, 0.0),
            drag_started_at: None,
            drag_axis: None,
            swipe_offset: 0.0,
            last_tap: None,
        }
    }

    pub fn apply_props(&mut self, props: ItemProps) {
        self.props = props;
    }

    pub fn props(&self) -> ItemProps {
        self.props
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pan(&self) -> (f64, f64) {
        (self.pan_x, self.pan_y)
    }

    pub fn is_zoomed(&self) -> bool {
        self.scale > MIN_SCALE + ZOOM_EPSILON
    }

    /// Axis the current drag locked to, if it moved past the slop.
    pub fn drag_axis(&self) -> Option<DragAxis> {
        self.drag_axis
    }

    pub fn swipe_offset(&self) -> f64 {
        self.swipe_offset
    }

    pub fn pinch_begin(&mut self) {
        self.pinch_start_scale = self.scale;
    }

    /// `relative` is the pinch scale relative to the pinch start.
    pub fn pinch_update(&mut self, relative: f64) -> Option<ItemEvent> {
        if !relative.is_finite() || relative <= 0.0 {
            return None;
        }
        self.set_scale(self.pinch_start_scale * relative)
    }

    /// Zoom by a factor around the current scale (keyboard or wheel input).
    pub fn zoom_by(&mut self, factor: f64) -> Option<ItemEvent> {
        if !factor.is_finite() || factor <= 0.0 {
            return None;
        }
        self.set_scale(self.scale * factor)
    }

    /// Register a tap; the second tap inside `DOUBLE_TAP_DELAY` toggles zoom.
    pub fn tap(&mut self, now: Instant) -> Option<ItemEvent> {
        if !self.props.double_tap_to_zoom_enabled {
            return None;
        }
        match self.last_tap.take() {
            Some(previous) if now.saturating_duration_since(previous) <= DOUBLE_TAP_DELAY => {
                let target = if self.is_zoomed() {
                    MIN_SCALE
                } else {
                    DOUBLE_TAP_SCALE
                };
                debug!(target, "Double tap zoom");
                self.set_scale(target)
            }
            _ => {
                self.last_tap = Some(now);
                None
            }
        }
    }

    pub fn long_press(&self) -> Option<ItemEvent> {
        Some(ItemEvent::LongPress)
    }

    pub fn drag_begin(&mut self, now: Instant) {
        self.drag_start_pan = (self.pan_x, self.pan_y);
        self.drag_started_at = Some(now);
        self.drag_axis = None;
    }

    /// `dx`/`dy` are offsets from the drag start point.
    pub fn drag_update(&mut self, dx: f64, dy: f64) -> Option<ItemEvent> {
        if self.drag_axis.is_none() && dx.hypot(dy) >= DRAG_SLOP {
            self.drag_axis = Some(if dx.abs() > dy.abs() {
                DragAxis::Horizontal
            } else {
                DragAxis::Vertical
            });
            trace!(axis = ?self.drag_axis, "Drag axis locked");
        }

        if self.is_zoomed() {
            let (start_x, start_y) = self.drag_start_pan;
            self.pan_x = start_x + dx;
            self.pan_y = start_y + dy;
            return None;
        }

        if self.drag_axis == Some(DragAxis::Vertical) && self.props.swipe_to_close_enabled {
            self.swipe_offset = dy;
            return Some(ItemEvent::OffsetYChanged(dy));
        }
        None
    }

    pub fn drag_end(&mut self, _dx: f64, dy: f64, now: Instant) -> Option<ItemEvent> {
        let started_at = self.drag_started_at.take();
        let axis = self.drag_axis.take();
        if self.is_zoomed() {
            // Zoom began mid-dismiss; drop the offset the swipe left behind.
            return self.spring_back();
        }
        if axis != Some(DragAxis::Vertical) {
            return None;
        }
        if !self.props.swipe_to_close_enabled {
            return self.spring_back();
        }

        let elapsed_ms = started_at
            .map(|t| now.saturating_duration_since(t).as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
            .max(1.0);
        let velocity = dy / elapsed_ms;
        if dy.abs() > SWIPE_CLOSE_OFFSET || velocity.abs() > SWIPE_CLOSE_VELOCITY {
            debug!(dy, velocity, "Swipe-to-close completed");
            return Some(ItemEvent::RequestClose);
        }
        self.spring_back()
    }

    /// Return to base scale and drop any pan, e.g. when the page is recycled.
    pub fn reset(&mut self) -> Option<ItemEvent> {
        self.drag_axis = None;
        self.drag_started_at = None;
        self.last_tap = None;
        self.swipe_offset = 0.0;
        self.set_scale(MIN_SCALE)
    }

    fn spring_back(&mut self) -> Option<ItemEvent> {
        if self.swipe_offset == 0.0 {
            return None;
        }
        self.swipe_offset = 0.0;
        Some(ItemEvent::OffsetYChanged(0.0))
    }

    fn set_scale(&mut self, scale: f64) -> Option<ItemEvent> {
        let was_zoomed = self.is_zoomed();
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        let zoomed = self.is_zoomed();
        if !zoomed {
            self.pan_x = 0.0;
            self.pan_y = 0.0;
        }
        (zoomed != was_zoomed).then_some(ItemEvent::ZoomChanged(zoomed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(swipe: bool) -> ItemProps {
        ItemProps {
            swipe_to_close_enabled: swipe,
            double_tap_to_zoom_enabled: true,
            long_press_delay: Duration::from_millis(800),
        }
    }

    #[test]
    fn test_pinch_reports_zoom_transitions_only() {
        let mut gesture = ItemGesture::new(props(true));
        gesture.pinch_begin();
        assert_eq!(gesture.pinch_update(1.5), Some(ItemEvent::ZoomChanged(true)));
        assert_eq!(gesture.pinch_update(1.8), None);
        assert_eq!(gesture.pinch_update(0.5), Some(ItemEvent::ZoomChanged(false)));
        assert_eq!(gesture.scale(), MIN_SCALE);
    }

    #[test]
    fn test_pinch_clamps_scale() {
        let mut gesture = ItemGesture::new(props(true));
        gesture.pinch_begin();
        gesture.pinch_update(50.0);
        assert_eq!(gesture.scale(), MAX_SCALE);
        assert_eq!(gesture.pinch_update(f64::NAN), None);
        assert_eq!(gesture.pinch_update(-1.0), None);
    }

    #[test]
    fn test_double_tap_toggles_zoom() {
        let mut gesture = ItemGesture::new(props(true));
        let now = Instant::now();

        assert_eq!(gesture.tap(now), None);
        assert_eq!(
            gesture.tap(now + Duration::from_millis(120)),
            Some(ItemEvent::ZoomChanged(true))
        );
        assert_eq!(gesture.scale(), DOUBLE_TAP_SCALE);

        let later = now + Duration::from_secs(2);
        assert_eq!(gesture.tap(later), None);
        assert_eq!(
            gesture.tap(later + Duration::from_millis(200)),
            Some(ItemEvent::ZoomChanged(false))
        );
    }

    #[test]
    fn test_slow_taps_do_not_zoom() {
        let mut gesture = ItemGesture::new(props(true));
        let now = Instant::now();
        gesture.tap(now);
        assert_eq!(gesture.tap(now + Duration::from_millis(450)), None);
        assert!(!gesture.is_zoomed());
    }

    #[test]
    fn test_double_tap_disabled() {
        let mut gesture = ItemGesture::new(ItemProps {
            double_tap_to_zoom_enabled: false,
            ..props(true)
        });
        let now = Instant::now();
        gesture.tap(now);
        assert_eq!(gesture.tap(now), None);
    }

    #[test]
    fn test_vertical_drag_reports_offset() {
        let mut gesture = ItemGesture::new(props(true));
        let now = Instant::now();
        gesture.drag_begin(now);

        assert_eq!(gesture.drag_update(0.0, 4.0), None);
        assert_eq!(
            gesture.drag_update(2.0, 30.0),
            Some(ItemEvent::OffsetYChanged(30.0))
        );
        assert_eq!(gesture.drag_axis(), Some(DragAxis::Vertical));
    }

    #[test]
    fn test_horizontal_drag_is_left_to_pager() {
        let mut gesture = ItemGesture::new(props(true));
        gesture.drag_begin(Instant::now());
        assert_eq!(gesture.drag_update(40.0, 5.0), None);
        assert_eq!(gesture.drag_axis(), Some(DragAxis::Horizontal));
        assert_eq!(gesture.drag_end(40.0, 5.0, Instant::now()), None);
    }

    #[test]
    fn test_long_swipe_requests_close() {
        let mut gesture = ItemGesture::new(props(true));
        let now = Instant::now();
        gesture.drag_begin(now);
        gesture.drag_update(0.0, 120.0);
        assert_eq!(
            gesture.drag_end(0.0, 120.0, now + Duration::from_millis(500)),
            Some(ItemEvent::RequestClose)
        );
    }

    #[test]
    fn test_fast_flick_requests_close() {
        let mut gesture = ItemGesture::new(props(true));
        let now = Instant::now();
        gesture.drag_begin(now);
        gesture.drag_update(0.0, -40.0);
        assert_eq!(
            gesture.drag_end(0.0, -40.0, now + Duration::from_millis(10)),
            Some(ItemEvent::RequestClose)
        );
    }

    #[test]
    fn test_short_slow_swipe_springs_back() {
        let mut gesture = ItemGesture::new(props(true));
        let now = Instant::now();
        gesture.drag_begin(now);
        gesture.drag_update(0.0, 40.0);
        assert_eq!(
            gesture.drag_end(0.0, 40.0, now + Duration::from_millis(400)),
            Some(ItemEvent::OffsetYChanged(0.0))
        );
        assert_eq!(gesture.swipe_offset(), 0.0);
    }

    #[test]
    fn test_swipe_disabled_ignores_vertical_drag() {
        let mut gesture = ItemGesture::new(props(false));
        let now = Instant::now();
        gesture.drag_begin(now);
        assert_eq!(gesture.drag_update(0.0, 200.0), None);
        assert_eq!(gesture.drag_end(0.0, 200.0, now), None);
    }

    #[test]
    fn test_zoomed_drag_pans_instead_of_dismissing() {
        let mut gesture = ItemGesture::new(props(true));
        let now = Instant::now();
        gesture.zoom_by(3.0);

        gesture.drag_begin(now);
        assert_eq!(gesture.drag_update(15.0, 200.0), None);
        assert_eq!(gesture.pan(), (15.0, 200.0));
        assert_eq!(gesture.drag_end(15.0, 200.0, now), None);

        gesture.drag_begin(now);
        gesture.drag_update(-5.0, 0.0);
        assert_eq!(gesture.pan(), (10.0, 200.0));
    }

    #[test]
    fn test_reset_unzooms() {
        let mut gesture = ItemGesture::new(props(true));
        gesture.zoom_by(2.0);
        assert_eq!(gesture.reset(), Some(ItemEvent::ZoomChanged(false)));
        assert_eq!(gesture.pan(), (0.0, 0.0));
        assert_eq!(gesture.reset(), None);
    }

    #[test]
    fn test_long_press() {
        let gesture = ItemGesture::new(props(true));
        assert_eq!(gesture.long_press(), Some(ItemEvent::LongPress));
    }

    #[test]
    fn test_zoom_during_dismiss_drag_clears_offset() {
        let mut gesture = ItemGesture::new(props(true));
        let now = Instant::now();
        gesture.drag_begin(now);
        assert_eq!(
            gesture.drag_update(0.0, 40.0),
            Some(ItemEvent::OffsetYChanged(40.0))
        );
        assert_eq!(gesture.zoom_by(2.0), Some(ItemEvent::ZoomChanged(true)));

        assert_eq!(
            gesture.drag_end(0.0, 40.0, now + Duration::from_millis(400)),
            Some(ItemEvent::OffsetYChanged(0.0))
        );
        assert_eq!(gesture.swipe_offset(), 0.0);
        assert_eq!(gesture.zoom_by(0.5), Some(ItemEvent::ZoomChanged(false)));
    }
}
