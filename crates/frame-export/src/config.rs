//! Export settings.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

/// Default movie frame rate.
pub const DEFAULT_FPS: u32 = 10;

/// Axis the preview looks along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewAxis {
    X,
    /// Looking along y at the x/z section
    #[default]
    Y,
    Z,
}

impl ViewAxis {
    /// `(depth, horizontal, vertical)` axis indices.
    pub fn axes(self) -> (usize, usize, usize) {
        match self {
            ViewAxis::X => (0, 1, 2),
            ViewAxis::Y => (1, 0, 2),
            ViewAxis::Z => (2, 0, 1),
        }
    }
}

impl FromStr for ViewAxis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x" => Ok(ViewAxis::X),
            "y" => Ok(ViewAxis::Y),
            "z" => Ok(ViewAxis::Z),
            _ => Err(format!("unknown view axis '{s}', expected x, y or z")),
        }
    }
}

/// Configuration for batch export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub fps: u32,
    /// Output width in pixels (even, for yuv420p)
    pub width: u32,
    /// Output height in pixels (even, for yuv420p)
    pub height: u32,
    /// Video file to write
    pub output: PathBuf,
    pub overwrite: bool,
    pub view_axis: ViewAxis,
    /// Background RGB
    pub background: [u8; 3],
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            width: 640,
            height: 480,
            output: PathBuf::from("resistivity.mp4"),
            overwrite: true,
            view_axis: ViewAxis::Y,
            background: [255, 255, 255],
        }
    }
}

impl ExportConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ExportError::validation("width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(ExportError::validation("fps must be non-zero"));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(ExportError::validation(
                "width/height must be even (required for yuv420p output)",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExportConfig::default();
        assert_eq!(config.fps, 10);
        assert_eq!(config.view_axis, ViewAxis::Y);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_odd_and_zero() {
        let odd = ExportConfig {
            width: 641,
            ..ExportConfig::default()
        };
        assert!(matches!(odd.validate(), Err(ExportError::Validation(_))));

        let still = ExportConfig {
            fps: 0,
            ..ExportConfig::default()
        };
        assert!(still.validate().is_err());
    }

    #[test]
    fn test_view_axis_parsing() {
        assert_eq!("Z".parse::<ViewAxis>().unwrap(), ViewAxis::Z);
        assert_eq!(ViewAxis::Y.axes(), (1, 0, 2));
        assert!("w".parse::<ViewAxis>().is_err());
    }
}
