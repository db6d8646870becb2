//! Effective value range tracking across frame updates.
//!
//! The operator sees a pair of range fields. While they match the
//! auto-detected range (within [`RANGE_SNAP_TOLERANCE`]) the range follows
//! the data. Once edited away from it the manual range sticks, frame after
//! frame, until a different scalar array is selected.

use resvis_common::{Provenance, ScalarSelection, ValueRange};
use tracing::{info, warn};

/// Two range ends closer than this are considered equal.
pub const RANGE_SNAP_TOLERANCE: f64 = 0.001;

/// Auto/manual hysteresis state for the current scalar selection.
#[derive(Debug, Clone)]
pub struct RangeTracker {
    selection: Option<ScalarSelection>,
    provenance: Provenance,
    displayed: Option<(f64, f64)>,
}

impl Default for RangeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeTracker {
    pub fn new() -> Self {
        Self {
            selection: None,
            provenance: Provenance::Auto,
            displayed: None,
        }
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Values the range fields should show after the last update.
    pub fn displayed(&self) -> Option<(f64, f64)> {
        self.displayed
    }

    /// Forget everything; the next update starts from the auto range.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Decide the effective range for this update.
    ///
    /// `manual` is what the range fields currently hold (`None` when the
    /// operator has not touched them).
    pub fn update(
        &mut self,
        selection: &ScalarSelection,
        auto: (f64, f64),
        manual: Option<(f64, f64)>,
    ) -> ValueRange {
        match &self.selection {
            Some(current) if current == selection => {}
            Some(_) => {
                // The fields still hold the previous array's range
                info!(scalar = %selection, "Scalar selection changed, range reset to auto");
                self.selection = Some(selection.clone());
                return self.snap_to_auto(auto);
            }
            None => self.selection = Some(selection.clone()),
        }

        let Some(manual) = manual else {
            return self.snap_to_auto(auto);
        };

        // Fields still showing the previous auto range have not been edited.
        if self.provenance == Provenance::Auto
            && self.displayed.is_some_and(|shown| within_tolerance(shown, manual))
        {
            return self.snap_to_auto(auto);
        }

        if within_tolerance(manual, auto) {
            if self.provenance == Provenance::Manual {
                info!(scalar = %selection, "Manual range matches auto range, back to auto");
            }
            return self.snap_to_auto(auto);
        }

        if manual.0 > manual.1 {
            warn!(
                min = manual.0,
                max = manual.1,
                "Ignoring manual range with min > max"
            );
            return self.snap_to_auto(auto);
        }

        if self.provenance == Provenance::Auto {
            info!(
                scalar = %selection,
                min = manual.0,
                max = manual.1,
                "Switching to manual range"
            );
        }
        self.provenance = Provenance::Manual;
        self.displayed = Some(manual);
        ValueRange::manual(manual.0, manual.1)
    }

    fn snap_to_auto(&mut self, auto: (f64, f64)) -> ValueRange {
        self.provenance = Provenance::Auto;
        self.displayed = Some(auto);
        ValueRange::auto(auto.0, auto.1)
    }
}

fn within_tolerance(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.0 - b.0).abs() <= RANGE_SNAP_TOLERANCE && (a.1 - b.1).abs() <= RANGE_SNAP_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTO: (f64, f64) = (-0.189, 4.970);

    fn resistivity() -> ScalarSelection {
        ScalarSelection::point("Resistivity(log10)")
    }

    #[test]
    fn test_first_update_is_auto() {
        let mut tracker = RangeTracker::new();
        let r = tracker.update(&resistivity(), AUTO, None);
        assert_eq!(r, ValueRange::auto(-0.189, 4.970));
        assert_eq!(tracker.displayed(), Some(AUTO));
    }

    #[test]
    fn test_manual_range_before_first_update_is_kept() {
        let mut tracker = RangeTracker::new();
        let r = tracker.update(&resistivity(), AUTO, Some((0.0, 5.0)));
        assert_eq!(r, ValueRange::manual(0.0, 5.0));
        assert_eq!(tracker.displayed(), Some((0.0, 5.0)));

        let r = tracker.update(&resistivity(), (-0.3, 4.5), tracker.displayed());
        assert_eq!(r, ValueRange::manual(0.0, 5.0));
    }

    #[test]
    fn test_initial_range_matching_auto_stays_auto() {
        let mut tracker = RangeTracker::new();
        let r = tracker.update(&resistivity(), AUTO, Some((-0.1895, 4.9695)));
        assert_eq!(r.provenance, Provenance::Auto);
        assert_eq!(tracker.displayed(), Some(AUTO));
    }

    #[test]
    fn test_small_edits_stay_auto() {
        let mut tracker = RangeTracker::new();
        tracker.update(&resistivity(), AUTO, None);

        let r = tracker.update(&resistivity(), AUTO, Some((-0.1895, 4.9705)));
        assert_eq!(r.provenance, Provenance::Auto);
        assert_eq!((r.min, r.max), AUTO);
        assert_eq!(tracker.displayed(), Some(AUTO));
    }

    #[test]
    fn test_manual_edit_persists() {
        let mut tracker = RangeTracker::new();
        tracker.update(&resistivity(), AUTO, None);

        for _ in 0..5 {
            let r = tracker.update(&resistivity(), AUTO, Some((0.0, 5.0)));
            assert_eq!(r, ValueRange::manual(0.0, 5.0));
        }

        // a new scalar resets to its own auto range
        let other = ScalarSelection::cell("Coverage");
        let r = tracker.update(&other, (0.0, 1.0), Some((0.0, 5.0)));
        assert_eq!(r, ValueRange::auto(0.0, 1.0));
    }

    #[test]
    fn test_auto_follows_moving_data_range() {
        let mut tracker = RangeTracker::new();
        tracker.update(&resistivity(), AUTO, None);

        // fields still show the old auto range; new frame has a wider range
        let shown = tracker.displayed();
        let r = tracker.update(&resistivity(), (-0.5, 5.5), shown);
        assert_eq!(r, ValueRange::auto(-0.5, 5.5));
    }

    #[test]
    fn test_inverted_manual_is_ignored() {
        let mut tracker = RangeTracker::new();
        tracker.update(&resistivity(), AUTO, None);
        let r = tracker.update(&resistivity(), AUTO, Some((3.0, 1.0)));
        assert_eq!(r.provenance, Provenance::Auto);
    }
}
