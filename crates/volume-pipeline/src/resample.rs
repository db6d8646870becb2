//! Budget-driven resampling of an irregular mesh field onto a uniform grid.
//!
//! The cell edge length is the cube root of `volume / target_cells`, so the
//! resulting grid is isotropic regardless of how elongated the box is. Each
//! axis gets `ceil(extent / cell_size) + 1` points, which always places a
//! grid point on the far boundary.

use resvis_common::{Bounds3, UniformGrid};
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::mesh::MeshSource;

/// Dimensions, spacing and origin of a resampling grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub dims: [usize; 3],
    pub spacing: [f64; 3],
    pub origin: [f64; 3],
}

impl GridGeometry {
    /// Size a grid for `bounds` so it holds roughly `target_cells` cells.
    pub fn for_budget(bounds: &Bounds3, target_cells: i64) -> Result<Self> {
        let extents = bounds.extents();
        let volume = bounds.volume();

        if !volume.is_finite() || volume <= 0.0 || target_cells <= 0 {
            return Err(PipelineError::DegenerateGrid {
                volume,
                target_cells,
            });
        }

        let cell_size = (volume / target_cells as f64).cbrt();
        let mut dims = [0usize; 3];
        let mut spacing = [0.0f64; 3];
        for axis in 0..3 {
            dims[axis] = (extents[axis] / cell_size).ceil() as usize + 1;
            spacing[axis] = extents[axis] / (dims[axis] - 1) as f64;
        }

        debug!(?dims, ?spacing, cell_size, "Sized resampling grid");

        Ok(Self {
            dims,
            spacing,
            origin: bounds.min_corner(),
        })
    }

    pub fn cell_count(&self) -> usize {
        self.dims.iter().map(|&n| n - 1).product()
    }
}

/// Resample the point field `values` of `mesh` onto a uniform grid covering
/// `bounds`.
///
/// Grid points outside the mesh get NaN; the artifact cleaner handles them.
pub fn resample(
    mesh: &dyn MeshSource,
    values: &[f64],
    bounds: &Bounds3,
    target_cells: i64,
) -> Result<UniformGrid> {
    let geometry = GridGeometry::for_budget(bounds, target_cells)?;
    let mut grid = UniformGrid::new(geometry.dims, geometry.spacing, geometry.origin);

    let [nx, ny, nz] = geometry.dims;
    let mut outside = 0usize;
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let p = grid.point(i, j, k);
                let idx = grid.flat_index(i, j, k);
                grid.values[idx] = match mesh.locate(p) {
                    Some(bc) => bc.interpolate(values),
                    None => {
                        outside += 1;
                        f64::NAN
                    }
                };
            }
        }
    }

    info!(
        dims = ?geometry.dims,
        cells = geometry.cell_count(),
        target_cells,
        outside,
        "Resampled field to uniform grid"
    );

    Ok(grid)
}
