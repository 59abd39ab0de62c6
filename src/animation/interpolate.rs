use std::cmp::Ordering;

/// Piecewise-linear mapping from an input range to an output range.
///
/// Inputs outside the first/last breakpoints are clamped to the end outputs,
/// never extrapolated.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolation {
    points: Vec<(f64, f64)>,
}

impl Interpolation {
    /// Builds a mapping from parallel input/output breakpoints.
    ///
    /// Returns `None` when the slices are empty, differ in length, or the
    /// inputs are not strictly increasing.
    pub fn new(inputs: &[f64], outputs: &[f64]) -> Option<Self> {
        if inputs.is_empty() || inputs.len() != outputs.len() {
            return None;
        }
        if inputs
            .windows(2)
            .any(|w| w[0].partial_cmp(&w[1]) != Some(Ordering::Less))
        {
            return None;
        }
        Some(Self {
            points: inputs.iter().copied().zip(outputs.iter().copied()).collect(),
        })
    }

    /// Symmetric tent around zero: `-reach -> edge`, `0 -> peak`, `reach -> edge`.
    pub fn tent(reach: f64, peak: f64, edge: f64) -> Self {
        let reach = reach.abs().max(f64::EPSILON);
        Self {
            points: vec![(-reach, edge), (0.0, peak), (reach, edge)],
        }
    }

    pub fn map(&self, input: f64) -> f64 {
        let (first_in, first_out) = self.points[0];
        let (last_in, last_out) = self.points[self.points.len() - 1];
        if input.is_nan() || input <= first_in {
            return first_out;
        }
        if input >= last_in {
            return last_out;
        }
        for pair in self.points.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            if input <= x1 {
                let t = (input - x0) / (x1 - x0);
                return y0 + (y1 - y0) * t;
            }
        }
        last_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_breakpoints() {
        assert!(Interpolation::new(&[], &[]).is_none());
        assert!(Interpolation::new(&[0.0, 1.0], &[1.0]).is_none());
        assert!(Interpolation::new(&[1.0, 0.0], &[0.0, 1.0]).is_none());
        assert!(Interpolation::new(&[1.0, 1.0], &[0.0, 1.0]).is_none());
    }

    #[test]
    fn test_two_point_mapping() {
        let lerp = Interpolation::new(&[0.0, 10.0], &[100.0, 200.0]).unwrap();
        assert_eq!(lerp.map(0.0), 100.0);
        assert_eq!(lerp.map(5.0), 150.0);
        assert_eq!(lerp.map(10.0), 200.0);
        assert_eq!(lerp.map(-1.0), 100.0);
        assert_eq!(lerp.map(11.0), 200.0);
    }

    #[test]
    fn test_single_point_is_constant() {
        let lerp = Interpolation::new(&[3.0], &[0.5]).unwrap();
        assert_eq!(lerp.map(-100.0), 0.5);
        assert_eq!(lerp.map(100.0), 0.5);
    }

    #[test]
    fn test_three_point_peak() {
        let lerp = Interpolation::new(&[-75.0, 0.0, 75.0], &[0.7, 1.0, 0.7]).unwrap();
        assert_eq!(lerp, Interpolation::tent(75.0, 1.0, 0.7));
        assert!((lerp.map(-37.5) - 0.85).abs() < 1e-12);
        assert!((lerp.map(37.5) - 0.85).abs() < 1e-12);
        assert_eq!(lerp.map(0.0), 1.0);
        assert_eq!(lerp.map(-200.0), 0.7);
        assert_eq!(lerp.map(f64::NAN), 0.7);
    }
}
