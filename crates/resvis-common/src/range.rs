//! Scalar value ranges and their provenance.

use serde::{Deserialize, Serialize};

/// Where an active value range came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Detected from the data
    Auto,
    /// Entered by the operator
    Manual,
}

/// A closed scalar interval `[min, max]`.
///
/// A range with `min > max` is treated as unset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub provenance: Provenance,
}

impl ValueRange {
    pub fn new(min: f64, max: f64, provenance: Provenance) -> Self {
        Self {
            min,
            max,
            provenance,
        }
    }

    pub fn auto(min: f64, max: f64) -> Self {
        Self::new(min, max, Provenance::Auto)
    }

    pub fn manual(min: f64, max: f64) -> Self {
        Self::new(min, max, Provenance::Manual)
    }

    /// Range of the finite values in `values`, or `None` if there are none.
    pub fn of_finite<'a, I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        if min > max {
            None
        } else {
            Some(Self::auto(min, max))
        }
    }

    /// Whether `min <= max` and both ends are finite.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Value at `fraction` of the way from `min` to `max`.
    #[inline]
    pub fn at_fraction(&self, fraction: f64) -> f64 {
        self.min + fraction * (self.max - self.min)
    }

    /// Grow this range to also cover `other`.
    pub fn union(&self, other: &ValueRange) -> ValueRange {
        ValueRange::new(
            self.min.min(other.min),
            self.max.max(other.max),
            self.provenance,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_finite_skips_nan_and_inf() {
        let data = [1.0, f64::NAN, -2.5, f64::INFINITY, 4.0, f64::NEG_INFINITY];
        let r = ValueRange::of_finite(&data).unwrap();
        assert_eq!((r.min, r.max), (-2.5, 4.0));
        assert_eq!(r.provenance, Provenance::Auto);

        assert!(ValueRange::of_finite(&[f64::NAN]).is_none());
        assert!(ValueRange::of_finite(&[]).is_none());
    }

    #[test]
    fn test_validity() {
        assert!(ValueRange::auto(-0.189, 4.970).is_valid());
        assert!(ValueRange::auto(1.0, 1.0).is_valid());
        assert!(!ValueRange::manual(2.0, 1.0).is_valid());
        assert!(!ValueRange::manual(f64::NAN, 1.0).is_valid());
    }

    #[test]
    fn test_at_fraction() {
        let r = ValueRange::auto(-1.0, 3.0);
        assert_eq!(r.at_fraction(0.0), -1.0);
        assert_eq!(r.at_fraction(0.5), 1.0);
        assert_eq!(r.at_fraction(1.0), 3.0);
    }
}
