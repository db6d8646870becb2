//! Color and opacity transfer functions.
//!
//! Both functions are lists of control points in scalar-value space, built
//! against the effective value range so every frame of a sequence maps a
//! given value to the same color and opacity.

pub mod opacity;
pub mod palette;

use resvis_common::ValueRange;
use serde::{Deserialize, Serialize};

pub use opacity::{OpacityChannels, OpacityPreset};
pub use palette::Palette;

/// A color control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorPoint {
    pub value: f64,
    pub rgb: [f64; 3],
}

/// An opacity control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpacityPoint {
    pub value: f64,
    pub opacity: f64,
}

/// Piecewise-linear value → RGB mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorTransferFunction {
    pub points: Vec<ColorPoint>,
}

impl ColorTransferFunction {
    /// Color at `value`, clamped to the end points. White if empty.
    pub fn color_at(&self, value: f64) -> [f64; 3] {
        let (lo, hi, t) = match bracket(&self.points, |p| p.value, value) {
            Some(b) => b,
            None => return [1.0, 1.0, 1.0],
        };
        let (a, b) = (self.points[lo].rgb, self.points[hi].rgb);
        [
            a[0] + (b[0] - a[0]) * t,
            a[1] + (b[1] - a[1]) * t,
            a[2] + (b[2] - a[2]) * t,
        ]
    }
}

/// Piecewise-linear value → opacity mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpacityTransferFunction {
    pub points: Vec<OpacityPoint>,
}

impl OpacityTransferFunction {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Opacity at `value`, clamped to the end points. Zero if empty.
    pub fn opacity_at(&self, value: f64) -> f64 {
        match bracket(&self.points, |p| p.value, value) {
            Some((lo, hi, t)) => {
                let (a, b) = (self.points[lo].opacity, self.points[hi].opacity);
                a + (b - a) * t
            }
            None => 0.0,
        }
    }

    /// Copy with every opacity multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| OpacityPoint {
                    value: p.value,
                    opacity: (p.opacity * factor).clamp(0.0, 1.0),
                })
                .collect(),
        }
    }
}

/// Place each palette anchor at `range.min + fraction * span`.
pub fn build_color(range: &ValueRange, palette: Palette) -> ColorTransferFunction {
    ColorTransferFunction {
        points: palette
            .anchors()
            .iter()
            .map(|&(fraction, rgb)| ColorPoint {
                value: range.at_fraction(fraction),
                rgb,
            })
            .collect(),
    }
}

/// Spread the opacity channels evenly across the range.
///
/// A zero-width range yields no control points.
pub fn build_opacity(range: &ValueRange, channels: &OpacityChannels) -> OpacityTransferFunction {
    if range.max == range.min || !range.is_valid() {
        return OpacityTransferFunction::default();
    }

    let last = (channels.len() - 1) as f64;
    OpacityTransferFunction {
        points: channels
            .as_slice()
            .iter()
            .enumerate()
            .map(|(i, &opacity)| OpacityPoint {
                value: range.at_fraction(i as f64 / last),
                opacity,
            })
            .collect(),
    }
}

/// Find the segment containing `value`: `(low index, high index, t)`.
fn bracket<T>(points: &[T], key: impl Fn(&T) -> f64, value: f64) -> Option<(usize, usize, f64)> {
    let first = points.first()?;
    let last_idx = points.len() - 1;

    if value <= key(first) {
        return Some((0, 0, 0.0));
    }
    if value >= key(&points[last_idx]) {
        return Some((last_idx, last_idx, 0.0));
    }

    let hi = points.iter().position(|p| key(p) > value)?;
    let lo = hi - 1;
    let (v0, v1) = (key(&points[lo]), key(&points[hi]));
    let t = if v1 > v0 { (value - v0) / (v1 - v0) } else { 0.0 };
    Some((lo, hi, t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_points_follow_palette_fractions() {
        let range = ValueRange::auto(0.0, 10.0);
        let tf = build_color(&range, Palette::RdYlBuR);
        let values: Vec<f64> = tf.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![0.0, 3.0, 5.0, 7.0, 10.0]);
        assert_eq!(tf.points[0].rgb, [0.0, 0.0, 1.0]);
        assert_eq!(tf.points[4].rgb, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_color_at_interpolates() {
        let tf = build_color(&ValueRange::auto(0.0, 10.0), Palette::RdYlBuR);
        // halfway between blue (0) and cyan (3)
        let c = tf.color_at(1.5);
        assert!((c[1] - 0.5).abs() < 1e-12);
        assert_eq!(tf.color_at(-5.0), [0.0, 0.0, 1.0]);
        assert_eq!(tf.color_at(50.0), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_opacity_even_spacing() {
        let range = ValueRange::auto(-1.0, 1.0);
        let channels = OpacityChannels::from_preset(OpacityPreset::LinearUp, 5).unwrap();
        let tf = build_opacity(&range, &channels);
        let values: Vec<f64> = tf.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert!((tf.opacity_at(0.25) - 0.625).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_range_omits_opacity() {
        let range = ValueRange::auto(2.0, 2.0);
        let tf = build_opacity(&range, &OpacityChannels::default());
        assert!(tf.is_empty());
        assert_eq!(tf.opacity_at(2.0), 0.0);
    }

    #[test]
    fn test_scaled() {
        let range = ValueRange::auto(0.0, 1.0);
        let channels = OpacityChannels::from_preset(OpacityPreset::Full, 3).unwrap();
        let tf = build_opacity(&range, &channels).scaled(0.7);
        assert!(tf.points.iter().all(|p| (p.opacity - 0.7).abs() < 1e-12));
    }
}
