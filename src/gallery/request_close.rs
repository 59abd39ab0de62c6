use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::animation::{AnimatedValue, Easing};
use crate::config::ModalAnimation;

/// Fade-out (or slide-out) time for the viewer content once a close is
/// requested.
pub const CLOSE_FADE_DURATION: Duration = Duration::from_millis(200);

pub type CloseCallback = Rc<dyn Fn()>;

/// Guards the external close callback so it fires once per session.
///
/// Several close intents can land in the same frame (a backdrop tap and a
/// finished dismiss swipe, for instance). Only the first one starts the
/// close transition and reaches the callback. The callback is invoked
/// immediately, not when the transition finishes.
pub struct RequestClose {
    on_close: Option<CloseCallback>,
    animation: ModalAnimation,
    // 1.0 while shown, animated to 0.0 once closing.
    presence: AnimatedValue,
    closing: bool,
}

impl fmt::Debug for RequestClose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestClose")
            .field("closing", &self.closing)
            .field("animation", &self.animation)
            .field("presence", &self.presence)
            .field("on_close", &self.on_close.as_ref().map(|_| "<closure>"))
            .finish()
    }
}

impl RequestClose {
    pub fn new(on_close: Option<CloseCallback>) -> Self {
        Self::with_animation(on_close, ModalAnimation::default())
    }

    pub fn with_animation(on_close: Option<CloseCallback>, animation: ModalAnimation) -> Self {
        Self {
            on_close,
            animation,
            presence: AnimatedValue::new(1.0),
            closing: false,
        }
    }

    pub fn animation(&self) -> ModalAnimation {
        self.animation
    }

    /// Request a close. Returns `true` if this call started the close.
    pub fn request(&mut self, now: Instant) -> bool {
        if self.closing {
            debug!("Close already in progress, ignoring request");
            return false;
        }
        self.closing = true;
        let duration = if self.animation.is_animated() {
            CLOSE_FADE_DURATION
        } else {
            Duration::ZERO
        };
        self.presence
            .animate_to(0.0, now, duration, Easing::CubicOut);
        if let Some(ref callback) = self.on_close {
            callback();
        }
        true
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    /// Content opacity: 1.0 until a close starts, then fading to 0.0.
    /// A sliding close keeps the content opaque.
    pub fn opacity(&self, now: Instant) -> f64 {
        if self.animation.slides() {
            return 1.0;
        }
        self.presence.value_at(now)
    }

    /// How far a sliding close has travelled, from 0.0 to 1.0. Always 0.0
    /// for the other animations.
    pub fn slide_progress(&self, now: Instant) -> f64 {
        if !self.animation.slides() {
            return 0.0;
        }
        1.0 - self.presence.value_at(now)
    }

    /// Whether the close transition has fully finished.
    pub fn is_faded_out(&self, now: Instant) -> bool {
        self.closing && !self.presence.is_animating(now)
    }

    /// Re-arm for a new session.
    pub fn reset(&mut self) {
        self.closing = false;
        self.presence.set_value(1.0);
    }
}
