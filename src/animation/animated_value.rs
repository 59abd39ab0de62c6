use std::time::{Duration, Instant};

use super::Easing;

/// A scalar that eases from where it currently is toward its latest target.
///
/// There is no cancellation API: calling `animate_to` while an animation is in
/// flight restarts the transition from the value sampled at `now`, so the most
/// recent target always wins and the value never jumps.
#[derive(Debug, Clone)]
pub struct AnimatedValue {
    from: f64,
    to: f64,
    started_at: Option<Instant>,
    duration: Duration,
    easing: Easing,
}

impl AnimatedValue {
    pub fn new(initial: f64) -> Self {
        Self {
            from: initial,
            to: initial,
            started_at: None,
            duration: Duration::ZERO,
            easing: Easing::Linear,
        }
    }

    /// Jump to `value` immediately, dropping any running transition.
    pub fn set_value(&mut self, value: f64) {
        self.from = value;
        self.to = value;
        self.started_at = None;
        self.duration = Duration::ZERO;
    }

    /// Start a transition toward `target` beginning at `now`.
    pub fn animate_to(&mut self, target: f64, now: Instant, duration: Duration, easing: Easing) {
        let current = self.value_at(now);
        if duration.is_zero() {
            self.set_value(target);
            return;
        }
        self.from = current;
        self.to = target;
        self.started_at = Some(now);
        self.duration = duration;
        self.easing = easing;
    }

    /// Sample the value at `now`.
    pub fn value_at(&self, now: Instant) -> f64 {
        let Some(started_at) = self.started_at else {
            return self.to;
        };
        let elapsed = now.saturating_duration_since(started_at);
        if elapsed >= self.duration {
            return self.to;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * self.easing.apply(t)
    }

    /// The value the current transition is heading to.
    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        match self.started_at {
            Some(started_at) => now.saturating_duration_since(started_at) < self.duration,
            None => false,
        }
    }
}

impl Default for AnimatedValue {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_200: Duration = Duration::from_millis(200);

    #[test]
    fn test_static_value() {
        let value = AnimatedValue::new(1.0);
        assert_eq!(value.value_at(Instant::now()), 1.0);
        assert!(!value.is_animating(Instant::now()));
    }

    #[test]
    fn test_linear_midpoint_and_end() {
        let start = Instant::now();
        let mut value = AnimatedValue::new(0.0);
        value.animate_to(100.0, start, MS_200, Easing::Linear);

        assert_eq!(value.value_at(start), 0.0);
        let mid = value.value_at(start + Duration::from_millis(100));
        assert!((mid - 50.0).abs() < 1e-9);
        assert_eq!(value.value_at(start + MS_200), 100.0);
        assert_eq!(value.value_at(start + Duration::from_secs(5)), 100.0);
        assert!(value.is_animating(start + Duration::from_millis(10)));
        assert!(!value.is_animating(start + MS_200));
    }

    #[test]
    fn test_retarget_starts_from_current_value() {
        let start = Instant::now();
        let mut value = AnimatedValue::new(0.0);
        value.animate_to(-300.0, start, MS_200, Easing::Linear);

        let halfway = start + Duration::from_millis(100);
        value.animate_to(0.0, halfway, MS_200, Easing::Linear);

        // No jump at the moment of retargeting
        assert!((value.value_at(halfway) - -150.0).abs() < 1e-9);
        assert_eq!(value.target(), 0.0);
        assert_eq!(value.value_at(halfway + MS_200), 0.0);
    }

    #[test]
    fn test_zero_duration_snaps() {
        let mut value = AnimatedValue::new(0.0);
        value.animate_to(42.0, Instant::now(), Duration::ZERO, Easing::QuadInOut);
        assert_eq!(value.value_at(Instant::now()), 42.0);
    }

    #[test]
    fn test_sampling_before_start_returns_origin() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut value = AnimatedValue::new(1.0);
        value.animate_to(0.0, start, MS_200, Easing::Linear);
        assert_eq!(value.value_at(start - Duration::from_millis(500)), 1.0);
    }
}
