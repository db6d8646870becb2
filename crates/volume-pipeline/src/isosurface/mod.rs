//! Isovalue selection and volume/isosurface co-visibility.
//!
//! Multiple surfaces are placed strictly inside the active range,
//! `min + k * span / (count + 1)` for `k = 1..=count`, so none of them
//! collapses onto the range boundary.

pub mod extract;

use resvis_common::{UniformGrid, ValueRange};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use extract::{marching_tetrahedra, TriangleMesh};

/// Surface opacity multiplier when more than one surface is drawn.
pub const MULTI_SURFACE_OPACITY_FACTOR: f64 = 0.7;

/// Isosurface opacity at or above which the volume is hidden.
pub const AUTO_HIDE_OPACITY: f64 = 0.9;

/// Isosurface opacity at or above which the volume is dimmed.
pub const VOLUME_DIM_OPACITY: f64 = 0.8;

/// Factor applied to volume opacity when dimmed.
pub const VOLUME_DIM_FACTOR: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsosurfaceMode {
    Single,
    Multiple,
}

/// Operator settings for isosurfaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsosurfaceSpec {
    pub mode: IsosurfaceMode,
    /// Isovalue in single mode, and the fallback in multiple mode
    pub value: f64,
    /// Number of surfaces in multiple mode
    pub count: u32,
    pub opacity: f64,
}

impl Default for IsosurfaceSpec {
    fn default() -> Self {
        Self {
            mode: IsosurfaceMode::Single,
            value: 2.0,
            count: 5,
            opacity: 0.5,
        }
    }
}

/// One isovalue and the opacity to draw its surface with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsosurfaceLayer {
    pub value: f64,
    pub opacity: f64,
}

/// An extracted isosurface.
#[derive(Debug, Clone)]
pub struct Isosurface {
    pub value: f64,
    pub opacity: f64,
    pub mesh: TriangleMesh,
}

/// How the volume rendering should appear next to isosurfaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "factor")]
pub enum VolumeVisibility {
    Visible,
    /// Opacity samples multiplied by the factor
    Dimmed(f64),
    Hidden,
}

/// Isovalues for `spec` over `range`.
///
/// Multiple mode falls back to the single value when the range is empty or
/// fewer than two surfaces are requested.
pub fn select_isovalues(spec: &IsosurfaceSpec, range: &ValueRange) -> Vec<f64> {
    match spec.mode {
        IsosurfaceMode::Multiple if range.max > range.min && spec.count > 1 => {
            let step = range.span() / (spec.count + 1) as f64;
            (1..=spec.count)
                .map(|k| range.min + k as f64 * step)
                .collect()
        }
        _ => vec![spec.value],
    }
}

/// Isovalues paired with their drawing opacity.
pub fn plan_layers(spec: &IsosurfaceSpec, range: &ValueRange) -> Vec<IsosurfaceLayer> {
    let values = select_isovalues(spec, range);
    let opacity = if values.len() > 1 {
        spec.opacity * MULTI_SURFACE_OPACITY_FACTOR
    } else {
        spec.opacity
    };

    values
        .into_iter()
        .map(|value| IsosurfaceLayer { value, opacity })
        .collect()
}

/// Extract every planned surface from `grid`.
pub fn generate(grid: &UniformGrid, spec: &IsosurfaceSpec, range: &ValueRange) -> Vec<Isosurface> {
    plan_layers(spec, range)
        .into_iter()
        .map(|layer| {
            let mesh = marching_tetrahedra(grid, layer.value);
            debug!(
                isovalue = layer.value,
                triangles = mesh.triangle_count(),
                "Extracted isosurface"
            );
            Isosurface {
                value: layer.value,
                opacity: layer.opacity,
                mesh,
            }
        })
        .collect()
}

/// Decide whether the volume stays, dims or hides next to isosurfaces.
pub fn volume_visibility(
    show_volume: bool,
    show_isosurfaces: bool,
    spec: &IsosurfaceSpec,
) -> VolumeVisibility {
    if !show_volume {
        return VolumeVisibility::Hidden;
    }
    if !show_isosurfaces {
        return VolumeVisibility::Visible;
    }
    if spec.opacity >= AUTO_HIDE_OPACITY {
        VolumeVisibility::Hidden
    } else if spec.opacity >= VOLUME_DIM_OPACITY {
        VolumeVisibility::Dimmed(VOLUME_DIM_FACTOR)
    } else {
        VolumeVisibility::Visible
    }
}
