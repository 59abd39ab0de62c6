//! Minimal animation primitives for the gallery core.
//!
//! - `Easing` - Time-based easing curves
//! - `AnimatedValue` - A scalar that interpolates toward its latest target
//! - `Interpolation` - Clamped piecewise-linear mapping between ranges

pub mod animated_value;
pub mod easing;
pub mod interpolate;

pub use animated_value::AnimatedValue;
pub use easing::Easing;
pub use interpolate::Interpolation;
