//! Pipeline configuration.
//!
//! Loaded from YAML, then overridden from `RESVIS_*` environment variables.
//!
//! ```yaml
//! catalog:
//!   frame_prefix: dcinv
//!   frame_extension: vtk
//! session:
//!   target_cells: 500000
//!   clip_bounds: { min_x: 2, max_x: 17, min_y: 2, max_y: 22, min_z: 22, max_z: 27 }
//!   scalar: { point: "Resistivity(log10)" }
//!   palette: RdYlBu_r
//!   manual_range: [0.0, 5.0]
//!   isosurface: { mode: multiple, value: 2.0, count: 5, opacity: 0.5 }
//!   show_isosurfaces: true
//!   range_mode: global
//! ```

use std::path::Path;

use resvis_common::ScalarSelection;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{DEFAULT_FRAME_EXTENSION, DEFAULT_FRAME_PREFIX};
use crate::error::{PipelineError, Result};
use crate::session::SessionParams;

/// Cell budgets outside this range are accepted but logged.
pub const RECOMMENDED_TARGET_CELLS: std::ops::RangeInclusive<i64> = 10_000..=2_000_000;

/// Which files make up the frame sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub frame_prefix: String,
    pub frame_extension: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            frame_prefix: DEFAULT_FRAME_PREFIX.to_string(),
            frame_extension: DEFAULT_FRAME_EXTENSION.to_string(),
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub catalog: CatalogConfig,
    pub session: SessionParams,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("RESVIS_TARGET_CELLS") {
            match val.trim().parse() {
                Ok(cells) => self.session.target_cells = cells,
                Err(_) => warn!(value = %val, "Ignoring invalid RESVIS_TARGET_CELLS"),
            }
        }

        if let Some(val) = lookup("RESVIS_PALETTE") {
            self.session.palette = val;
        }

        if let Some(val) = lookup("RESVIS_SCALAR") {
            self.session.scalar = ScalarSelection::parse(&val);
        }

        if let Some(val) = lookup("RESVIS_FRAME_PREFIX") {
            self.catalog.frame_prefix = val;
        }

        if let Some(val) = lookup("RESVIS_FRAME_EXTENSION") {
            self.catalog.frame_extension = val.trim_start_matches('.').to_string();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let session = &self.session;

        if self.catalog.frame_prefix.is_empty() || self.catalog.frame_extension.is_empty() {
            return Err(PipelineError::invalid_config(
                "frame_prefix and frame_extension must not be empty",
            ));
        }

        if session.target_cells <= 0 {
            return Err(PipelineError::invalid_config("target_cells must be > 0"));
        }
        if !RECOMMENDED_TARGET_CELLS.contains(&session.target_cells) {
            warn!(
                target_cells = session.target_cells,
                "target_cells outside the recommended 10000..=2000000"
            );
        }

        if let Some(b) = session.clip_bounds {
            let ok = b.to_array().iter().all(|v| v.is_finite())
                && b.min_x <= b.max_x
                && b.min_y <= b.max_y
                && b.min_z <= b.max_z;
            if !ok {
                return Err(PipelineError::invalid_config(format!(
                    "clip_bounds must be finite with min <= max, got {:?}",
                    b.to_array()
                )));
            }
        }

        if let Some((min, max)) = session.manual_range {
            if !min.is_finite() || !max.is_finite() {
                return Err(PipelineError::invalid_config("manual_range must be finite"));
            }
        }

        let iso = &session.isosurface;
        if !(0.0..=1.0).contains(&iso.opacity) {
            return Err(PipelineError::invalid_config(
                "isosurface opacity must be within 0..=1",
            ));
        }
        if !iso.value.is_finite() {
            return Err(PipelineError::invalid_config("isosurface value must be finite"));
        }

        Ok(())
    }
}
