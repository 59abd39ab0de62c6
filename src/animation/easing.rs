/// Easing curve applied to normalized animation progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Quadratic ease-in-out, the curve used for bar slides.
    #[default]
    QuadInOut,
    /// Cubic ease-out, used for the close transition so it starts fast.
    CubicOut,
}

impl Easing {
    /// Maps progress `t` in `[0, 1]` to eased progress in `[0, 1]`.
    /// Values outside the range are clamped first.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_are_fixed() {
        for easing in [Easing::Linear, Easing::QuadInOut, Easing::CubicOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
    }

    #[test]
    fn test_quad_in_out_is_symmetric() {
        let a = Easing::QuadInOut.apply(0.25);
        let b = Easing::QuadInOut.apply(0.75);
        assert!((a + b - 1.0).abs() < 1e-12);
        assert!((Easing::QuadInOut.apply(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_progress_is_clamped() {
        assert_eq!(Easing::QuadInOut.apply(-3.0), 0.0);
        assert_eq!(Easing::CubicOut.apply(7.5), 1.0);
        assert_eq!(Easing::Linear.apply(f64::NAN), 1.0);
    }
}
