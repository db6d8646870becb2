//! Mesh collaborator seam.
//!
//! The pipeline does not parse mesh files. It consumes anything that can
//! report its bounds, expose named point/cell arrays, promote cell data to
//! points, and locate a position inside one of its (tetrahedral) cells.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::sync::OnceLock;

use resvis_common::{Bounds3, ScalarSelection};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::Frame;
use crate::error::{PipelineError, Result};

/// A tet whose volume determinant is below this fraction of the product of
/// its edge lengths is treated as flat.
const DEGENERATE_TET_RATIO: f64 = 1e-12;

/// Interpolation weights of a location inside one tetrahedral cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barycentric {
    pub points: [usize; 4],
    pub weights: [f64; 4],
}

impl Barycentric {
    /// Weighted sum of `values` at the cell's corner points.
    #[inline]
    pub fn interpolate(&self, values: &[f64]) -> f64 {
        self.points
            .iter()
            .zip(self.weights.iter())
            .map(|(&p, &w)| values[p] * w)
            .sum()
    }
}

/// What the pipeline needs from an in-memory mesh.
pub trait MeshSource {
    /// Axis-aligned bounding box of the mesh points.
    fn bounds(&self) -> Bounds3;

    fn point_count(&self) -> usize;

    /// Coordinates of point `index`.
    fn point(&self, index: usize) -> [f64; 3];

    /// Names of point-associated scalar arrays, sorted.
    fn point_scalar_names(&self) -> Vec<String>;

    /// Names of cell-associated scalar arrays, sorted.
    fn cell_scalar_names(&self) -> Vec<String>;

    fn point_scalars(&self, name: &str) -> Option<&[f64]>;

    fn cell_scalars(&self, name: &str) -> Option<&[f64]>;

    /// Promote a cell array to point granularity.
    fn cell_to_point(&self, cell_values: &[f64]) -> Vec<f64>;

    /// Find the cell containing `p`; `None` outside the mesh.
    fn locate(&self, p: [f64; 3]) -> Option<Barycentric>;
}

/// Loads the mesh behind a catalog frame.
pub trait MeshLoader {
    fn load(&self, frame: &Frame) -> Result<Box<dyn MeshSource>>;
}

/// A scalar array resolved to point granularity.
#[derive(Debug, Clone)]
pub struct ResolvedScalar {
    /// The array actually used (differs from the request after substitution)
    pub selection: ScalarSelection,
    /// One value per mesh point
    pub values: Vec<f64>,
    /// True when the requested array was missing
    pub substituted: bool,
}

/// Resolve `selection` against `mesh`, promoting cell data to points.
///
/// A missing array is replaced by the first available one (point arrays
/// before cell arrays, each in name order) and the substitution is logged.
pub fn resolve_scalar(mesh: &dyn MeshSource, selection: &ScalarSelection) -> Result<ResolvedScalar> {
    if let Some(values) = lookup(mesh, selection) {
        return Ok(ResolvedScalar {
            selection: selection.clone(),
            values,
            substituted: false,
        });
    }

    let fallback = mesh
        .point_scalar_names()
        .into_iter()
        .map(ScalarSelection::PointScalar)
        .chain(
            mesh.cell_scalar_names()
                .into_iter()
                .map(ScalarSelection::CellScalar),
        )
        .next()
        .ok_or(PipelineError::NoScalars)?;

    warn!(
        requested = %selection,
        substituted = %fallback,
        "Requested scalar not found, using first available array"
    );

    let values = lookup(mesh, &fallback).ok_or(PipelineError::NoScalars)?;
    Ok(ResolvedScalar {
        selection: fallback,
        values,
        substituted: true,
    })
}

fn lookup(mesh: &dyn MeshSource, selection: &ScalarSelection) -> Option<Vec<f64>> {
    match selection {
        ScalarSelection::PointScalar(name) => mesh.point_scalars(name).map(<[f64]>::to_vec),
        ScalarSelection::CellScalar(name) => {
            let cells = mesh.cell_scalars(name)?;
            debug!(array = %name, "Promoting cell data to point data");
            Some(mesh.cell_to_point(cells))
        }
    }
}

/// Tetrahedral mesh with named point and cell arrays.
///
/// This is the in-memory representation the bundled loader produces; any
/// other [`MeshSource`] works equally well with the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TetMesh {
    pub points: Vec<[f64; 3]>,
    pub tets: Vec<[usize; 4]>,
    #[serde(default)]
    pub point_data: BTreeMap<String, Vec<f64>>,
    #[serde(default)]
    pub cell_data: BTreeMap<String, Vec<f64>>,
    #[serde(skip)]
    index: OnceLock<BucketIndex>,
}

impl TetMesh {
    pub fn new(points: Vec<[f64; 3]>, tets: Vec<[usize; 4]>) -> Self {
        Self {
            points,
            tets,
            ..Default::default()
        }
    }

    pub fn with_point_data(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.point_data.insert(name.into(), values);
        self
    }

    pub fn with_cell_data(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.cell_data.insert(name.into(), values);
        self
    }

    /// Check connectivity and array lengths.
    pub fn validate(&self) -> Result<()> {
        let n = self.points.len();
        if let Some(bad) = self.tets.iter().flatten().find(|&&i| i >= n) {
            return Err(PipelineError::mesh_load(format!(
                "cell references point {bad} but mesh has {n} points"
            )));
        }
        for (name, values) in &self.point_data {
            if values.len() != n {
                return Err(PipelineError::mesh_load(format!(
                    "point array '{name}' has {} values for {n} points",
                    values.len()
                )));
            }
        }
        for (name, values) in &self.cell_data {
            if values.len() != self.tets.len() {
                return Err(PipelineError::mesh_load(format!(
                    "cell array '{name}' has {} values for {} cells",
                    values.len(),
                    self.tets.len()
                )));
            }
        }
        Ok(())
    }

    fn index(&self) -> &BucketIndex {
        self.index
            .get_or_init(|| BucketIndex::build(&self.points, &self.tets))
    }

    fn barycentric(&self, tet: usize, p: [f64; 3]) -> Option<Barycentric> {
        const EPS: f64 = 1e-9;

        let ids = self.tets[tet];
        let a = self.points[ids[0]];
        let v0 = sub(self.points[ids[1]], a);
        let v1 = sub(self.points[ids[2]], a);
        let v2 = sub(self.points[ids[3]], a);
        let vp = sub(p, a);

        // Flatness relative to the tet's own size, so any length unit works
        let det = dot(v0, cross(v1, v2));
        let scale = norm(v0) * norm(v1) * norm(v2);
        if det.abs() <= DEGENERATE_TET_RATIO * scale {
            return None;
        }

        let l1 = dot(vp, cross(v1, v2)) / det;
        let l2 = dot(v0, cross(vp, v2)) / det;
        let l3 = dot(v0, cross(v1, vp)) / det;
        let l0 = 1.0 - l1 - l2 - l3;

        let weights = [l0, l1, l2, l3];
        if weights.iter().all(|&w| w >= -EPS) {
            Some(Barycentric {
                points: ids,
                weights,
            })
        } else {
            None
        }
    }
}

impl MeshSource for TetMesh {
    fn bounds(&self) -> Bounds3 {
        Bounds3::enclosing(&self.points).unwrap_or(Bounds3::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0))
    }

    fn point_count(&self) -> usize {
        self.points.len()
    }

    fn point(&self, index: usize) -> [f64; 3] {
        self.points[index]
    }

    fn point_scalar_names(&self) -> Vec<String> {
        self.point_data.keys().cloned().collect()
    }

    fn cell_scalar_names(&self) -> Vec<String> {
        self.cell_data.keys().cloned().collect()
    }

    fn point_scalars(&self, name: &str) -> Option<&[f64]> {
        self.point_data.get(name).map(Vec::as_slice)
    }

    fn cell_scalars(&self, name: &str) -> Option<&[f64]> {
        self.cell_data.get(name).map(Vec::as_slice)
    }

    fn cell_to_point(&self, cell_values: &[f64]) -> Vec<f64> {
        let mut sums = vec![0.0f64; self.points.len()];
        let mut counts = vec![0u32; self.points.len()];

        for (tet, &value) in self.tets.iter().zip(cell_values) {
            for &p in tet {
                sums[p] += value;
                counts[p] += 1;
            }
        }

        sums.into_iter()
            .zip(counts)
            .map(|(sum, count)| {
                if count == 0 {
                    f64::NAN
                } else {
                    sum / count as f64
                }
            })
            .collect()
    }

    fn locate(&self, p: [f64; 3]) -> Option<Barycentric> {
        self.index()
            .candidates(p)
            .iter()
            .find_map(|&tet| self.barycentric(tet as usize, p))
    }
}

/// Uniform bucket grid over tetrahedron bounding boxes.
#[derive(Debug, Clone, Default)]
struct BucketIndex {
    bounds: Option<Bounds3>,
    dims: [usize; 3],
    buckets: Vec<Vec<u32>>,
}

impl BucketIndex {
    fn build(points: &[[f64; 3]], tets: &[[usize; 4]]) -> Self {
        let Some(bounds) = Bounds3::enclosing(points) else {
            return Self::default();
        };

        // Roughly two cells per bucket.
        let per_axis = ((tets.len() as f64 / 2.0).cbrt().ceil() as usize).clamp(1, 128);
        let dims = [per_axis; 3];
        let mut buckets = vec![Vec::new(); per_axis * per_axis * per_axis];

        let index = Self {
            bounds: Some(bounds),
            dims,
            buckets: Vec::new(),
        };

        for (t, tet) in tets.iter().enumerate() {
            let corners: Vec<[f64; 3]> = tet.iter().map(|&i| points[i]).collect();
            let Some(tb) = Bounds3::enclosing(&corners) else {
                continue;
            };
            let lo = index.cell_of(tb.min_corner());
            let hi = index.cell_of(tb.max_corner());
            for k in lo[2]..=hi[2] {
                for j in lo[1]..=hi[1] {
                    for i in lo[0]..=hi[0] {
                        buckets[i + dims[0] * (j + dims[1] * k)].push(t as u32);
                    }
                }
            }
        }

        Self { buckets, ..index }
    }

    fn cell_of(&self, p: [f64; 3]) -> [usize; 3] {
        let Some(b) = self.bounds else {
            return [0; 3];
        };
        let min = b.min_corner();
        let ext = b.extents();
        let mut cell = [0usize; 3];
        for axis in 0..3 {
            let n = self.dims[axis];
            let t = if ext[axis] > 0.0 {
                (p[axis] - min[axis]) / ext[axis]
            } else {
                0.0
            };
            cell[axis] = ((t * n as f64).floor().max(0.0) as usize).min(n - 1);
        }
        cell
    }

    fn candidates(&self, p: [f64; 3]) -> &[u32] {
        match self.bounds {
            Some(b) if within_tolerance(&b, p) => {
                let [i, j, k] = self.cell_of(p);
                &self.buckets[i + self.dims[0] * (j + self.dims[1] * k)]
            }
            _ => &[],
        }
    }
}

/// Containment with a small relative slack for points computed as
/// `origin + i * spacing` that land an ulp outside the far face.
fn within_tolerance(b: &Bounds3, p: [f64; 3]) -> bool {
    let slack = 1e-9 * b.extents().iter().fold(0.0f64, |m, &e| m.max(e));
    let min = b.min_corner();
    let max = b.max_corner();
    (0..3).all(|axis| p[axis] >= min[axis] - slack && p[axis] <= max[axis] + slack)
}

#[inline]
fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

#[inline]
fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Reads frames stored as serde-JSON [`TetMesh`] documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMeshLoader;

impl MeshLoader for JsonMeshLoader {
    fn load(&self, frame: &Frame) -> Result<Box<dyn MeshSource>> {
        let file = File::open(&frame.path)?;
        let mesh: TetMesh = serde_json::from_reader(BufReader::new(file))?;
        mesh.validate()?;
        debug!(
            frame = frame.index,
            points = mesh.points.len(),
            cells = mesh.tets.len(),
            "Loaded mesh"
        );
        Ok(Box::new(mesh))
    }
}
