//! Scalar array selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix the operator-facing array lists append to cell arrays.
pub const CELL_SUFFIX: &str = " (cell)";

/// Whether an array is attached to mesh points or mesh cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Association {
    Point,
    Cell,
}

/// The scalar array the operator wants to visualize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarSelection {
    #[serde(rename = "point")]
    PointScalar(String),
    #[serde(rename = "cell")]
    CellScalar(String),
}

impl ScalarSelection {
    pub fn point(name: impl Into<String>) -> Self {
        Self::PointScalar(name.into())
    }

    pub fn cell(name: impl Into<String>) -> Self {
        Self::CellScalar(name.into())
    }

    /// Parse a display label; a trailing `" (cell)"` marks cell data.
    pub fn parse(label: &str) -> Self {
        match label.strip_suffix(CELL_SUFFIX) {
            Some(name) => Self::CellScalar(name.to_string()),
            None => Self::PointScalar(label.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::PointScalar(name) | Self::CellScalar(name) => name,
        }
    }

    pub fn association(&self) -> Association {
        match self {
            Self::PointScalar(_) => Association::Point,
            Self::CellScalar(_) => Association::Cell,
        }
    }
}

impl Default for ScalarSelection {
    fn default() -> Self {
        Self::PointScalar("Resistivity(log10)".to_string())
    }
}

impl fmt::Display for ScalarSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PointScalar(name) => write!(f, "{name}"),
            Self::CellScalar(name) => write!(f, "{name}{CELL_SUFFIX}"),
        }
    }
}
