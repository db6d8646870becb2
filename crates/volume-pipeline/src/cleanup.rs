//! Removal of interpolation artifacts from a resampled field.
//!
//! Two passes, always in this order:
//! 1. NaN/Inf samples become `min(finite samples) - 1.0`.
//! 2. Samples outside the source range widened by 10% on each side become
//!    `source_min - 1.0`.
//!
//! Both replacement values sit below the displayed range so they render as
//! empty space.

use resvis_common::ValueRange;
use tracing::info;

/// Fraction of the source span tolerated as interpolation overshoot.
pub const RANGE_BUFFER_FRACTION: f64 = 0.1;

/// Offset below the minimum used for replacement values.
pub const SENTINEL_OFFSET: f64 = 1.0;

/// Cleaned samples plus diagnostic counts.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedField {
    pub values: Vec<f64>,
    /// Samples that were NaN or infinite
    pub nan_count: usize,
    /// Finite samples outside the tolerated source range
    pub range_count: usize,
}

/// Clean `resampled` using the value range of the original `source` field.
pub fn clean(mut resampled: Vec<f64>, source: &[f64]) -> CleanedField {
    let source_range = ValueRange::of_finite(source);

    let nan_fill = ValueRange::of_finite(&resampled)
        .map(|r| r.min)
        .or(source_range.map(|r| r.min))
        .unwrap_or(0.0)
        - SENTINEL_OFFSET;

    let mut nan_count = 0;
    for v in resampled.iter_mut().filter(|v| !v.is_finite()) {
        *v = nan_fill;
        nan_count += 1;
    }

    let mut range_count = 0;
    if let Some(valid) = source_range {
        let buffer = RANGE_BUFFER_FRACTION * valid.span();
        let (lo, hi) = (valid.min - buffer, valid.max + buffer);
        let artifact = valid.min - SENTINEL_OFFSET;
        for v in resampled.iter_mut().filter(|v| **v < lo || **v > hi) {
            *v = artifact;
            range_count += 1;
        }
    }

    if nan_count > 0 {
        info!(nan_count, fill = nan_fill, "Replaced NaN/Inf samples");
    }
    if range_count > 0 {
        info!(range_count, "Replaced out-of-range samples");
    }

    CleanedField {
        values: resampled,
        nan_count,
        range_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_and_inf_replaced_below_finite_min() {
        let out = clean(vec![1.0, f64::NAN, 2.0, f64::INFINITY], &[1.0, 2.0]);
        assert_eq!(out.nan_count, 2);
        assert!(out.values.iter().all(|v| v.is_finite()));
        // min(finite) - 1 = 0.0, which is below 1 - 0.1 and then re-flagged
        assert_eq!(out.values[1], 0.0);
        assert_eq!(out.range_count, 2);
    }

    #[test]
    fn test_out_of_range_threshold() {
        // source [0, 10] -> tolerated [-1, 11]
        let source = [0.0, 10.0];
        let out = clean(vec![-1.0, -1.5, 11.0, 11.5, 5.0], &source);
        assert_eq!(out.values, vec![-1.0, -1.0, 11.0, -1.0, 5.0]);
        assert_eq!(out.range_count, 2);
        assert_eq!(out.nan_count, 0);
    }

    #[test]
    fn test_all_nan_resampled_uses_source_min() {
        let out = clean(vec![f64::NAN; 3], &[4.0, 6.0]);
        assert!(out.values.iter().all(|&v| v == 3.0));
        assert_eq!(out.nan_count, 3);
    }

    #[test]
    fn test_all_nan_everywhere_fills_minus_one() {
        let out = clean(vec![f64::NAN, f64::INFINITY], &[f64::NAN]);
        assert_eq!(out.values, vec![-1.0, -1.0]);
        assert_eq!((out.nan_count, out.range_count), (2, 0));
    }

    #[test]
    fn test_clean_field_untouched() {
        let out = clean(vec![1.0, 1.5, 2.0], &[1.0, 2.0]);
        assert_eq!(out.values, vec![1.0, 1.5, 2.0]);
        assert_eq!((out.nan_count, out.range_count), (0, 0));
    }
}
