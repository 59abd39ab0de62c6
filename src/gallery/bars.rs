use std::time::{Duration, Instant};

use tracing::debug;

use crate::animation::{AnimatedValue, Easing};

/// Distance the bars travel to leave the screen.
pub const BAR_HIDDEN_OFFSET: f64 = 300.0;
/// Slide duration shared by header and footer.
pub const BAR_ANIMATION_DURATION: Duration = Duration::from_millis(200);
const BAR_EASING: Easing = Easing::QuadInOut;

/// Header and footer slide offsets.
///
/// The header moves up (negative) and the footer down (positive) when hidden.
/// Both transitions share start time, duration and easing, so the bars move
/// in lockstep.
#[derive(Debug, Clone)]
pub struct BarsAnimation {
    header: AnimatedValue,
    footer: AnimatedValue,
    visible: bool,
}

impl BarsAnimation {
    pub fn new() -> Self {
        Self {
            header: AnimatedValue::new(0.0),
            footer: AnimatedValue::new(0.0),
            visible: true,
        }
    }

    pub fn set_visible(&mut self, visible: bool, now: Instant) {
        let (header, footer) = if visible {
            (0.0, 0.0)
        } else {
            (-BAR_HIDDEN_OFFSET, BAR_HIDDEN_OFFSET)
        };
        debug!(visible, "Animating bars");
        self.visible = visible;
        self.header
            .animate_to(header, now, BAR_ANIMATION_DURATION, BAR_EASING);
        self.footer
            .animate_to(footer, now, BAR_ANIMATION_DURATION, BAR_EASING);
    }

    /// Visibility the bars are heading toward.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Vertical header translation in pixels (0 or negative).
    pub fn header_offset(&self, now: Instant) -> f64 {
        self.header.value_at(now)
    }

    /// Vertical footer translation in pixels (0 or positive).
    pub fn footer_offset(&self, now: Instant) -> f64 {
        self.footer.value_at(now)
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.header.is_animating(now) || self.footer.is_animating(now)
    }

    /// Snap both bars back on screen without animating.
    pub fn reset(&mut self) {
        self.visible = true;
        self.header.set_value(0.0);
        self.footer.set_value(0.0);
    }
}

impl Default for BarsAnimation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_visible() {
        let bars = BarsAnimation::new();
        let now = Instant::now();
        assert!(bars.is_visible());
        assert_eq!(bars.header_offset(now), 0.0);
        assert_eq!(bars.footer_offset(now), 0.0);
    }

    #[test]
    fn test_hide_moves_bars_off_screen() {
        let mut bars = BarsAnimation::new();
        let now = Instant::now();
        bars.set_visible(false, now);

        let done = now + BAR_ANIMATION_DURATION;
        assert_eq!(bars.header_offset(done), -BAR_HIDDEN_OFFSET);
        assert_eq!(bars.footer_offset(done), BAR_HIDDEN_OFFSET);
        assert!(!bars.is_animating(done));
    }

    #[test]
    fn test_header_and_footer_move_in_lockstep() {
        let mut bars = BarsAnimation::new();
        let now = Instant::now();
        bars.set_visible(false, now);

        for ms in [0, 40, 100, 160, 200] {
            let t = now + Duration::from_millis(ms);
            assert_eq!(bars.header_offset(t), -bars.footer_offset(t));
        }
    }

    #[test]
    fn test_show_supersedes_hide_in_flight() {
        let mut bars = BarsAnimation::new();
        let now = Instant::now();
        bars.set_visible(false, now);

        let mid = now + Duration::from_millis(100);
        let header_mid = bars.header_offset(mid);
        bars.set_visible(true, mid);

        assert!(bars.is_visible());
        assert_eq!(bars.header_offset(mid), header_mid);
        assert_eq!(bars.header_offset(mid + BAR_ANIMATION_DURATION), 0.0);
        assert_eq!(bars.footer_offset(mid + BAR_ANIMATION_DURATION), 0.0);
    }

    #[test]
    fn test_reset_snaps_back() {
        let mut bars = BarsAnimation::new();
        let now = Instant::now();
        bars.set_visible(false, now);
        bars.reset();
        assert!(bars.is_visible());
        assert_eq!(bars.header_offset(now + Duration::from_millis(50)), 0.0);
    }
}
