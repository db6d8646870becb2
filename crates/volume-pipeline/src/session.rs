//! Operator-editable parameters and the state carried between updates.

use resvis_common::{Bounds3, ScalarSelection, ValueRange};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::isosurface::IsosurfaceSpec;
use crate::range::RangeTracker;
use crate::transfer::{OpacityChannels, Palette};

/// Default number of grid cells to resample into.
pub const DEFAULT_TARGET_CELLS: i64 = 500_000;

/// Where the auto-detected range comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeMode {
    /// Range of the current frame's source field
    #[default]
    Frame,
    /// Range across every frame in the catalog
    Global,
}

/// Visualization parameters applied on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionParams {
    pub target_cells: i64,
    /// Clipping box, intersected with the mesh bounds
    pub clip_bounds: Option<Bounds3>,
    /// `{ point: name }` or `{ cell: name }`
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub scalar: ScalarSelection,
    pub palette: String,
    pub opacity_channels: OpacityChannels,
    /// Contents of the min/max range fields
    pub manual_range: Option<(f64, f64)>,
    pub isosurface: IsosurfaceSpec,
    pub show_volume: bool,
    pub show_isosurfaces: bool,
    pub range_mode: RangeMode,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            target_cells: DEFAULT_TARGET_CELLS,
            clip_bounds: None,
            scalar: ScalarSelection::default(),
            palette: Palette::default().name().to_string(),
            opacity_channels: OpacityChannels::default(),
            manual_range: None,
            isosurface: IsosurfaceSpec::default(),
            show_volume: true,
            show_isosurfaces: false,
            range_mode: RangeMode::Frame,
        }
    }
}

/// Mutable session state passed explicitly into every frame update.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub params: SessionParams,
    tracker: RangeTracker,
    global_range: Option<ValueRange>,
}

impl Session {
    pub fn new(params: SessionParams) -> Self {
        Self {
            params,
            tracker: RangeTracker::new(),
            global_range: None,
        }
    }

    pub fn tracker(&self) -> &RangeTracker {
        &self.tracker
    }

    pub fn global_range(&self) -> Option<ValueRange> {
        self.global_range
    }

    /// Store the result of a catalog-wide range scan for the current scalar.
    pub fn set_global_range(&mut self, range: Option<ValueRange>) {
        self.global_range = range;
    }

    /// Select a different scalar array.
    ///
    /// Clears the range fields, the tracker and any global range, so the next
    /// update starts from the new array's auto range.
    pub fn set_scalar(&mut self, scalar: ScalarSelection) {
        if self.params.scalar == scalar {
            return;
        }
        info!(from = %self.params.scalar, to = %scalar, "Scalar selection changed");
        self.params.scalar = scalar;
        self.params.manual_range = None;
        self.tracker.reset();
        self.global_range = None;
    }

    /// Type values into the range fields.
    pub fn set_manual_range(&mut self, min: f64, max: f64) {
        self.params.manual_range = Some((min, max));
    }

    pub fn clear_manual_range(&mut self) {
        self.params.manual_range = None;
    }

    /// Run the range tracker for `selection` and snap the range fields to
    /// whatever it decided to display.
    pub(crate) fn apply_range(&mut self, selection: &ScalarSelection, auto: ValueRange) -> ValueRange {
        let effective = self
            .tracker
            .update(selection, (auto.min, auto.max), self.params.manual_range);
        self.params.manual_range = self.tracker.displayed();
        effective
    }
}
