//! Per-frame pipeline: resolve, resample, clean, range, transfer functions,
//! isosurfaces.
//!
//! Every update recomputes everything from the mesh. Only the range tracker
//! and the session parameters carry over between updates.

use resvis_common::{Bounds3, ScalarSelection, UniformGrid, ValueRange};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{Frame, FrameCatalog};
use crate::cleanup;
use crate::error::{PipelineError, Result};
use crate::isosurface::{self, Isosurface, VolumeVisibility};
use crate::mesh::{resolve_scalar, MeshLoader, MeshSource};
use crate::resample::resample;
use crate::session::{RangeMode, Session};
use crate::transfer::{
    build_color, build_opacity, ColorTransferFunction, OpacityTransferFunction, Palette,
};

/// Everything the volume and surface renderers need for one frame.
#[derive(Debug, Clone)]
pub struct VolumeScene {
    pub frame_index: u64,
    /// Scalar array actually rendered
    pub scalar: ScalarSelection,
    pub grid: UniformGrid,
    pub color: ColorTransferFunction,
    /// Empty when the effective range is degenerate
    pub opacity: OpacityTransferFunction,
    pub visibility: VolumeVisibility,
    pub isosurfaces: Vec<Isosurface>,
    pub range: ValueRange,
    pub nan_count: usize,
    pub range_count: usize,
}

/// Non-volumetric rendering of the clipped geometry.
#[derive(Debug, Clone, Serialize)]
pub struct FallbackScene {
    pub frame_index: u64,
    pub bounds: Bounds3,
    pub reason: String,
}

/// Result of one successful update.
#[derive(Debug, Clone)]
pub enum FrameOutput {
    Volume(Box<VolumeScene>),
    Fallback(FallbackScene),
}

impl FrameOutput {
    pub fn frame_index(&self) -> u64 {
        match self {
            FrameOutput::Volume(scene) => scene.frame_index,
            FrameOutput::Fallback(scene) => scene.frame_index,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, FrameOutput::Fallback(_))
    }
}

/// Short description of a frame output, suitable for JSON reporting.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSummary {
    pub frame_index: u64,
    pub kind: &'static str,
    pub scalar: Option<String>,
    pub dims: Option<[usize; 3]>,
    pub spacing: Option<[f64; 3]>,
    pub range: Option<ValueRange>,
    pub visibility: Option<VolumeVisibility>,
    pub isovalues: Vec<f64>,
    pub isosurface_triangles: usize,
    pub nan_count: usize,
    pub range_count: usize,
    pub reason: Option<String>,
}

impl From<&FrameOutput> for FrameSummary {
    fn from(output: &FrameOutput) -> Self {
        match output {
            FrameOutput::Volume(scene) => Self {
                frame_index: scene.frame_index,
                kind: "volume",
                scalar: Some(scene.scalar.to_string()),
                dims: Some(scene.grid.dims),
                spacing: Some(scene.grid.spacing),
                range: Some(scene.range),
                visibility: Some(scene.visibility),
                isovalues: scene.isosurfaces.iter().map(|s| s.value).collect(),
                isosurface_triangles: scene
                    .isosurfaces
                    .iter()
                    .map(|s| s.mesh.triangle_count())
                    .sum(),
                nan_count: scene.nan_count,
                range_count: scene.range_count,
                reason: None,
            },
            FrameOutput::Fallback(scene) => Self {
                frame_index: scene.frame_index,
                kind: "fallback",
                scalar: None,
                dims: None,
                spacing: None,
                range: None,
                visibility: None,
                isovalues: Vec::new(),
                isosurface_triangles: 0,
                nan_count: 0,
                range_count: 0,
                reason: Some(scene.reason.clone()),
            },
        }
    }
}

/// Drives frame updates using a mesh loader.
pub struct FramePipeline<L> {
    loader: L,
}

impl<L: MeshLoader> FramePipeline<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Load `frame` and run a full update on it.
    pub fn run_frame(&self, session: &mut Session, frame: &Frame) -> Result<FrameOutput> {
        let mesh = self.loader.load(frame)?;
        self.update(session, frame, mesh.as_ref())
    }

    /// Run a full update for `frame` on an already loaded mesh.
    ///
    /// A degenerate resampling box yields [`FrameOutput::Fallback`] rather
    /// than an error.
    pub fn update(
        &self,
        session: &mut Session,
        frame: &Frame,
        mesh: &dyn MeshSource,
    ) -> Result<FrameOutput> {
        let resolved = resolve_scalar(mesh, &session.params.scalar)?;
        let mesh_bounds = mesh.bounds();

        let bounds = match session.params.clip_bounds {
            Some(clip) => match mesh_bounds.intersection(&clip) {
                Some(b) => b,
                None => {
                    warn!(frame = frame.index, "Clip bounds do not overlap the mesh");
                    return Ok(FrameOutput::Fallback(FallbackScene {
                        frame_index: frame.index,
                        bounds: clip,
                        reason: "clip bounds do not overlap the mesh".to_string(),
                    }));
                }
            },
            None => mesh_bounds,
        };

        let mut grid = match resample(mesh, &resolved.values, &bounds, session.params.target_cells) {
            Ok(grid) => grid,
            Err(err @ PipelineError::DegenerateGrid { .. }) => {
                warn!(frame = frame.index, error = %err, "Falling back to outline rendering");
                return Ok(FrameOutput::Fallback(FallbackScene {
                    frame_index: frame.index,
                    bounds,
                    reason: err.to_string(),
                }));
            }
            Err(err) => return Err(err),
        };

        let source = source_values_within(mesh, &resolved.values, &bounds);
        let cleaned = cleanup::clean(std::mem::take(&mut grid.values), &source);
        grid.values = cleaned.values;

        let auto = self.auto_range(session, &source, &grid);
        let range = session.apply_range(&resolved.selection, auto);

        let params = &session.params;
        let color = build_color(&range, Palette::from_name(&params.palette));
        let mut opacity = build_opacity(&range, &params.opacity_channels);
        if opacity.is_empty() {
            debug!(frame = frame.index, "Degenerate range, opacity omitted");
        }

        let visibility =
            isosurface::volume_visibility(params.show_volume, params.show_isosurfaces, &params.isosurface);
        if let VolumeVisibility::Dimmed(factor) = visibility {
            opacity = opacity.scaled(factor);
        }

        let isosurfaces = if params.show_isosurfaces {
            isosurface::generate(&grid, &params.isosurface, &range)
        } else {
            Vec::new()
        };

        info!(
            frame = frame.index,
            scalar = %resolved.selection,
            min = range.min,
            max = range.max,
            provenance = ?range.provenance,
            nan_count = cleaned.nan_count,
            range_count = cleaned.range_count,
            isosurfaces = isosurfaces.len(),
            "Frame updated"
        );

        Ok(FrameOutput::Volume(Box::new(VolumeScene {
            frame_index: frame.index,
            scalar: resolved.selection,
            grid,
            color,
            opacity,
            visibility,
            isosurfaces,
            range,
            nan_count: cleaned.nan_count,
            range_count: cleaned.range_count,
        })))
    }

    fn auto_range(&self, session: &Session, source: &[f64], grid: &UniformGrid) -> ValueRange {
        if session.params.range_mode == RangeMode::Global {
            match session.global_range() {
                Some(global) => return global,
                None => debug!("No global range scanned yet, using frame range"),
            }
        }

        ValueRange::of_finite(source)
            .or_else(|| ValueRange::of_finite(&grid.values))
            .unwrap_or_else(|| ValueRange::auto(0.0, 0.0))
    }

    /// Fold the finite range of `selection` over every frame in `catalog`.
    ///
    /// Frames that fail to load or resolve are skipped with a warning.
    pub fn scan_global_range(
        &self,
        catalog: &FrameCatalog,
        selection: &ScalarSelection,
    ) -> Option<ValueRange> {
        let mut global: Option<ValueRange> = None;

        for frame in catalog.iter() {
            let resolved = match self
                .loader
                .load(&frame)
                .and_then(|mesh| resolve_scalar(mesh.as_ref(), selection))
            {
                Ok(resolved) => resolved,
                Err(err) => {
                    warn!(frame = frame.index, error = %err, "Skipping frame in range scan");
                    continue;
                }
            };

            if let Some(r) = ValueRange::of_finite(&resolved.values) {
                debug!(frame = frame.index, min = r.min, max = r.max, "Frame range");
                global = Some(match global {
                    Some(g) => g.union(&r),
                    None => r,
                });
            }
        }

        if let Some(g) = global {
            info!(min = g.min, max = g.max, frames = catalog.len(), "Global range");
        }
        global
    }
}

/// Source values at mesh points inside `bounds`, or all of them when none
/// fall inside.
fn source_values_within(mesh: &dyn MeshSource, values: &[f64], bounds: &Bounds3) -> Vec<f64> {
    let inside: Vec<f64> = values
        .iter()
        .enumerate()
        .filter(|(i, _)| bounds.contains_point(mesh.point(*i)))
        .map(|(_, v)| *v)
        .collect();

    if inside.is_empty() {
        values.to_vec()
    } else {
        inside
    }
}
