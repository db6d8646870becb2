//! Uniform (image-data style) grids.

use crate::Bounds3;
use serde::{Deserialize, Serialize};

/// A regular 3D lattice with constant axis-aligned spacing and one scalar
/// value per grid point.
///
/// Values are stored x-fastest: index = `i + nx * (j + ny * k)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformGrid {
    /// Number of points along x, y, z
    pub dims: [usize; 3],
    /// Distance between neighbouring points along x, y, z
    pub spacing: [f64; 3],
    /// Coordinates of grid point (0, 0, 0)
    pub origin: [f64; 3],
    /// Sampled scalar values, one per point
    pub values: Vec<f64>,
}

impl UniformGrid {
    /// Create a grid with every value set to NaN.
    pub fn new(dims: [usize; 3], spacing: [f64; 3], origin: [f64; 3]) -> Self {
        let len = dims[0] * dims[1] * dims[2];
        Self {
            dims,
            spacing,
            origin,
            values: vec![f64::NAN; len],
        }
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of hexahedral cells between grid points.
    pub fn cell_count(&self) -> usize {
        self.dims
            .iter()
            .map(|&n| n.saturating_sub(1))
            .product()
    }

    /// Flat index of grid point `(i, j, k)`.
    #[inline]
    pub fn flat_index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.dims[0] * (j + self.dims[1] * k)
    }

    /// World coordinates of grid point `(i, j, k)`.
    #[inline]
    pub fn point(&self, i: usize, j: usize, k: usize) -> [f64; 3] {
        [
            self.origin[0] + i as f64 * self.spacing[0],
            self.origin[1] + j as f64 * self.spacing[1],
            self.origin[2] + k as f64 * self.spacing[2],
        ]
    }

    #[inline]
    pub fn value(&self, i: usize, j: usize, k: usize) -> f64 {
        self.values[self.flat_index(i, j, k)]
    }

    /// Box spanned by the grid points.
    pub fn bounds(&self) -> Bounds3 {
        let far = self.point(
            self.dims[0].saturating_sub(1),
            self.dims[1].saturating_sub(1),
            self.dims[2].saturating_sub(1),
        );
        Bounds3::new(
            self.origin[0],
            far[0],
            self.origin[1],
            far[1],
            self.origin[2],
            far[2],
        )
    }

    /// Trilinear interpolation at a world position.
    ///
    /// Returns `None` outside the grid. NaN corners propagate as NaN.
    pub fn sample(&self, p: [f64; 3]) -> Option<f64> {
        let mut base = [0usize; 3];
        let mut frac = [0.0f64; 3];

        for axis in 0..3 {
            let n = self.dims[axis];
            if n < 2 || self.spacing[axis] <= 0.0 {
                return None;
            }
            let t = (p[axis] - self.origin[axis]) / self.spacing[axis];
            let last = (n - 1) as f64;
            if !(0.0..=last).contains(&t) {
                return None;
            }
            let cell = (t.floor() as usize).min(n - 2);
            base[axis] = cell;
            frac[axis] = t - cell as f64;
        }

        let [i, j, k] = base;
        let [fx, fy, fz] = frac;

        let c00 = lerp(self.value(i, j, k), self.value(i + 1, j, k), fx);
        let c10 = lerp(self.value(i, j + 1, k), self.value(i + 1, j + 1, k), fx);
        let c01 = lerp(self.value(i, j, k + 1), self.value(i + 1, j, k + 1), fx);
        let c11 = lerp(
            self.value(i, j + 1, k + 1),
            self.value(i + 1, j + 1, k + 1),
            fx,
        );

        let c0 = lerp(c00, c10, fy);
        let c1 = lerp(c01, c11, fy);
        Some(lerp(c0, c1, fz))
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_grid() -> UniformGrid {
        // value = x + 10y + 100z on a 3x3x3 lattice with spacing 0.5
        let mut grid = UniformGrid::new([3, 3, 3], [0.5, 0.5, 0.5], [1.0, 2.0, 3.0]);
        for k in 0..3 {
            for j in 0..3 {
                for i in 0..3 {
                    let p = grid.point(i, j, k);
                    let idx = grid.flat_index(i, j, k);
                    grid.values[idx] = p[0] + 10.0 * p[1] + 100.0 * p[2];
                }
            }
        }
        grid
    }

    #[test]
    fn test_layout() {
        let grid = UniformGrid::new([4, 3, 2], [1.0, 1.0, 1.0], [0.0, 0.0, 0.0]);
        assert_eq!(grid.len(), 24);
        assert_eq!(grid.cell_count(), 3 * 2);
        assert_eq!(grid.flat_index(1, 0, 0), 1);
        assert_eq!(grid.flat_index(0, 1, 0), 4);
        assert_eq!(grid.flat_index(0, 0, 1), 12);
        assert!(grid.values.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_bounds() {
        let grid = ramp_grid();
        assert_eq!(grid.bounds().to_array(), [1.0, 2.0, 2.0, 3.0, 3.0, 4.0]);
    }

    #[test]
    fn test_sample_is_exact_for_linear_field() {
        let grid = ramp_grid();
        let p = [1.3, 2.7, 3.9];
        let expected = p[0] + 10.0 * p[1] + 100.0 * p[2];
        assert!((grid.sample(p).unwrap() - expected).abs() < 1e-9);

        // far corner is inside
        let corner = grid.sample([2.0, 3.0, 4.0]).unwrap();
        assert!((corner - (2.0 + 30.0 + 400.0)).abs() < 1e-9);
    }

    #[test]
    fn test_sample_outside() {
        let grid = ramp_grid();
        assert!(grid.sample([0.9, 2.5, 3.5]).is_none());
        assert!(grid.sample([1.5, 2.5, 4.1]).is_none());
    }
}
