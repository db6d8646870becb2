//! Synthetic meshes and scalar fields.
//!
//! Meshes are structured hexahedral lattices with every hex split into six
//! tetrahedra, which makes barycentric interpolation of any linear field
//! exact. The serialised layout matches the JSON mesh documents the
//! pipeline's loader reads.

use std::collections::BTreeMap;

use resvis_common::Bounds3;
use serde::Serialize;

/// Corner offsets of a hex, bit 0 = +x, bit 1 = +y, bit 2 = +z.
const HEX_CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// Six tetrahedra sharing the 0-7 diagonal.
const HEX_TETS: [[usize; 4]; 6] = [
    [0, 1, 3, 7],
    [0, 1, 5, 7],
    [0, 2, 3, 7],
    [0, 2, 6, 7],
    [0, 4, 5, 7],
    [0, 4, 6, 7],
];

/// Point/tetrahedron mesh with named arrays.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyntheticMesh {
    pub points: Vec<[f64; 3]>,
    pub tets: Vec<[usize; 4]>,
    pub point_data: BTreeMap<String, Vec<f64>>,
    pub cell_data: BTreeMap<String, Vec<f64>>,
}

impl SyntheticMesh {
    /// Structured mesh over `bounds` with `dims` points per axis.
    ///
    /// # Example
    ///
    /// ```
    /// use resvis_common::Bounds3;
    /// use test_utils::SyntheticMesh;
    ///
    /// let mesh = SyntheticMesh::structured(Bounds3::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0), [3, 3, 3]);
    /// assert_eq!(mesh.points.len(), 27);
    /// assert_eq!(mesh.tets.len(), 8 * 6);
    /// ```
    pub fn structured(bounds: Bounds3, dims: [usize; 3]) -> Self {
        let [nx, ny, nz] = dims;
        assert!(nx >= 2 && ny >= 2 && nz >= 2, "need at least 2 points per axis");

        let min = bounds.min_corner();
        let ext = bounds.extents();
        let step = [
            ext[0] / (nx - 1) as f64,
            ext[1] / (ny - 1) as f64,
            ext[2] / (nz - 1) as f64,
        ];
        let id = |i: usize, j: usize, k: usize| i + nx * (j + ny * k);

        let mut points = Vec::with_capacity(nx * ny * nz);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    points.push([
                        min[0] + i as f64 * step[0],
                        min[1] + j as f64 * step[1],
                        min[2] + k as f64 * step[2],
                    ]);
                }
            }
        }

        let mut tets = Vec::with_capacity((nx - 1) * (ny - 1) * (nz - 1) * 6);
        for k in 0..nz - 1 {
            for j in 0..ny - 1 {
                for i in 0..nx - 1 {
                    let corner = HEX_CORNERS.map(|[dx, dy, dz]| id(i + dx, j + dy, k + dz));
                    for tet in HEX_TETS {
                        tets.push(tet.map(|c| corner[c]));
                    }
                }
            }
        }

        Self {
            points,
            tets,
            ..Default::default()
        }
    }

    /// Add a point array sampled from `f` at every point.
    pub fn with_point_field<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn([f64; 3]) -> f64,
    {
        let values = self.points.iter().map(|&p| f(p)).collect();
        self.point_data.insert(name.to_string(), values);
        self
    }

    /// Add a cell array sampled from `f` at every tetrahedron centroid.
    pub fn with_cell_field<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn([f64; 3]) -> f64,
    {
        let values = self
            .tets
            .iter()
            .map(|tet| {
                let mut c = [0.0; 3];
                for &p in tet {
                    for axis in 0..3 {
                        c[axis] += self.points[p][axis] / 4.0;
                    }
                }
                f(c)
            })
            .collect();
        self.cell_data.insert(name.to_string(), values);
        self
    }

    /// Overwrite one point value, e.g. to plant a NaN.
    pub fn set_point_value(&mut self, name: &str, index: usize, value: f64) {
        if let Some(values) = self.point_data.get_mut(name) {
            values[index] = value;
        }
    }

    pub fn point_values(&self, name: &str) -> &[f64] {
        self.point_data.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("synthetic mesh serialises")
    }
}

/// Linear field `a·x + b·y + c·z + d`.
pub fn linear_field(a: f64, b: f64, c: f64, d: f64) -> impl Fn([f64; 3]) -> f64 {
    move |p| a * p[0] + b * p[1] + c * p[2] + d
}

/// log10 resistivity of a layered dam section with a conductive seepage zone.
///
/// Values stay within roughly `[-0.2, 5.0]`. `phase` in `[0, 1]` moves the
/// seepage zone along x so consecutive frames differ.
pub fn layered_resistivity(bounds: Bounds3, phase: f64) -> impl Fn([f64; 3]) -> f64 {
    let min = bounds.min_corner();
    let ext = bounds.extents();
    move |p| {
        let depth = ((bounds.max_z - p[2]) / ext[2].max(f64::EPSILON)).clamp(0.0, 1.0);
        let layer = 4.8 - 3.0 * depth;

        let cx = min[0] + ext[0] * (0.2 + 0.6 * phase);
        let cy = min[1] + 0.5 * ext[1];
        let r2 = ((p[0] - cx) / (0.2 * ext[0].max(f64::EPSILON))).powi(2)
            + ((p[1] - cy) / (0.3 * ext[1].max(f64::EPSILON))).powi(2);
        let seepage = 1.9 * (-r2).exp() * depth;

        layer - seepage
    }
}
