//! Isosurface extraction by marching tetrahedra.
//!
//! Each grid cell is split into six tetrahedra sharing the cell's main
//! diagonal (corner 0 to corner 7). The split is the same in every cell, so
//! faces between neighbouring cells triangulate identically and the surface
//! has no cracks. Vertices on a grid edge are shared between triangles.

use std::collections::HashMap;

use resvis_common::UniformGrid;
use serde::{Deserialize, Serialize};

/// Corner offsets of a cell, bit 0 = +x, bit 1 = +y, bit 2 = +z.
const CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// The six monotone paths from corner 0 to corner 7.
const TETS: [[usize; 4]; 6] = [
    [0, 1, 3, 7],
    [0, 1, 5, 7],
    [0, 2, 3, 7],
    [0, 2, 6, 7],
    [0, 4, 5, 7],
    [0, 4, 6, 7],
];

/// Grid index of a cell corner and its sample.
type Corner = ([usize; 3], f64);

/// Indexed triangle mesh. Triangle winding is not normalised.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Total surface area.
    pub fn area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| {
                let a = self.vertices[t[0] as usize];
                let b = self.vertices[t[1] as usize];
                let c = self.vertices[t[2] as usize];
                let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
                let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
                let n = [
                    u[1] * v[2] - u[2] * v[1],
                    u[2] * v[0] - u[0] * v[2],
                    u[0] * v[1] - u[1] * v[0],
                ];
                0.5 * (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt()
            })
            .sum()
    }
}

struct Builder<'a> {
    grid: &'a UniformGrid,
    level: f64,
    mesh: TriangleMesh,
    edge_vertices: HashMap<(usize, usize), u32>,
}

impl Builder<'_> {
    /// Vertex where the surface crosses the grid edge between points `a` and `b`.
    fn vertex(&mut self, a: Corner, b: Corner) -> u32 {
        let ga = self.grid.flat_index(a.0[0], a.0[1], a.0[2]);
        let gb = self.grid.flat_index(b.0[0], b.0[1], b.0[2]);
        let key = if ga < gb { (ga, gb) } else { (gb, ga) };

        if let Some(&id) = self.edge_vertices.get(&key) {
            return id;
        }

        let pa = self.grid.point(a.0[0], a.0[1], a.0[2]);
        let pb = self.grid.point(b.0[0], b.0[1], b.0[2]);
        let t = if b.1 != a.1 {
            ((self.level - a.1) / (b.1 - a.1)).clamp(0.0, 1.0)
        } else {
            0.5
        };

        let id = self.mesh.vertices.len() as u32;
        self.mesh.vertices.push([
            pa[0] + (pb[0] - pa[0]) * t,
            pa[1] + (pb[1] - pa[1]) * t,
            pa[2] + (pb[2] - pa[2]) * t,
        ]);
        self.edge_vertices.insert(key, id);
        id
    }

    fn tetrahedron(&mut self, corners: [Corner; 4]) {
        let (inside, outside): (Vec<&Corner>, Vec<&Corner>) =
            corners.iter().partition(|(_, v)| *v >= self.level);

        match (inside.len(), outside.len()) {
            (1, 3) | (3, 1) => {
                let (lone, others) = if inside.len() == 1 {
                    (*inside[0], outside)
                } else {
                    (*outside[0], inside)
                };
                let a = self.vertex(lone, *others[0]);
                let b = self.vertex(lone, *others[1]);
                let c = self.vertex(lone, *others[2]);
                self.mesh.triangles.push([a, b, c]);
            }
            (2, 2) => {
                let (p, q) = (*inside[0], *inside[1]);
                let (r, s) = (*outside[0], *outside[1]);
                let pr = self.vertex(p, r);
                let ps = self.vertex(p, s);
                let qs = self.vertex(q, s);
                let qr = self.vertex(q, r);
                self.mesh.triangles.push([pr, ps, qs]);
                self.mesh.triangles.push([pr, qs, qr]);
            }
            _ => {}
        }
    }
}

/// Extract the surface `value == level` from `grid`.
///
/// Cells with a non-finite corner are skipped.
pub fn marching_tetrahedra(grid: &UniformGrid, level: f64) -> TriangleMesh {
    let [nx, ny, nz] = grid.dims;
    let mut builder = Builder {
        grid,
        level,
        mesh: TriangleMesh::default(),
        edge_vertices: HashMap::new(),
    };

    if nx < 2 || ny < 2 || nz < 2 || grid.values.len() != grid.len() {
        return builder.mesh;
    }

    for k in 0..nz - 1 {
        for j in 0..ny - 1 {
            for i in 0..nx - 1 {
                let cell: [([usize; 3], f64); 8] = CORNERS.map(|[dx, dy, dz]| {
                    let idx = [i + dx, j + dy, k + dz];
                    (idx, grid.value(idx[0], idx[1], idx[2]))
                });

                if cell.iter().any(|(_, v)| !v.is_finite()) {
                    continue;
                }
                if cell.iter().all(|(_, v)| *v >= level) || cell.iter().all(|(_, v)| *v < level) {
                    continue;
                }

                for tet in TETS {
                    builder.tetrahedron(tet.map(|c| cell[c]));
                }
            }
        }
    }

    builder.mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance_grid(n: usize, center: [f64; 3]) -> UniformGrid {
        let h = 1.0 / (n - 1) as f64;
        let mut grid = UniformGrid::new([n, n, n], [h, h, h], [0.0, 0.0, 0.0]);
        for k in 0..n {
            for j in 0..n {
                for i in 0..n {
                    let p = grid.point(i, j, k);
                    let d = ((p[0] - center[0]).powi(2)
                        + (p[1] - center[1]).powi(2)
                        + (p[2] - center[2]).powi(2))
                    .sqrt();
                    let idx = grid.flat_index(i, j, k);
                    grid.values[idx] = d;
                }
            }
        }
        grid
    }

    #[test]
    fn test_sphere_vertices_lie_on_sphere() {
        let grid = distance_grid(21, [0.5, 0.5, 0.5]);
        let mesh = marching_tetrahedra(&grid, 0.3);
        assert!(!mesh.is_empty());
        for v in &mesh.vertices {
            let d = ((v[0] - 0.5).powi(2) + (v[1] - 0.5).powi(2) + (v[2] - 0.5).powi(2)).sqrt();
            assert!((d - 0.3).abs() < 0.02, "vertex at distance {d}");
        }
    }

    #[test]
    fn test_sphere_area() {
        let grid = distance_grid(31, [0.5, 0.5, 0.5]);
        let mesh = marching_tetrahedra(&grid, 0.3);
        let expected = 4.0 * std::f64::consts::PI * 0.09;
        assert!((mesh.area() - expected).abs() / expected < 0.05);
    }

    #[test]
    fn test_level_outside_field_is_empty() {
        let grid = distance_grid(5, [0.5, 0.5, 0.5]);
        assert!(marching_tetrahedra(&grid, 10.0).is_empty());
        assert!(marching_tetrahedra(&grid, -1.0).is_empty());
    }

    #[test]
    fn test_shared_vertices() {
        let grid = distance_grid(11, [0.5, 0.5, 0.5]);
        let mesh = marching_tetrahedra(&grid, 0.3);
        // each vertex is used by several triangles
        assert!(mesh.vertex_count() < mesh.triangle_count() * 3 / 2);
    }
}
