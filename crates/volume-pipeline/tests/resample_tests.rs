//! Tests for grid sizing, resampling and artifact cleanup together.

use test_utils::{assert_approx_eq, linear_field, SyntheticMesh};
use volume_pipeline::{
    clean, resample, Bounds3, GridGeometry, MeshSource, PipelineError, TetMesh,
};

fn to_tet_mesh(mesh: SyntheticMesh) -> TetMesh {
    let mut tet = TetMesh::new(mesh.points, mesh.tets);
    for (name, values) in mesh.point_data {
        tet = tet.with_point_data(name, values);
    }
    for (name, values) in mesh.cell_data {
        tet = tet.with_cell_data(name, values);
    }
    tet
}

// ============================================================================
// Grid sizing properties
// ============================================================================

#[test]
fn test_dims_at_least_two_for_any_budget() {
    let boxes = [
        Bounds3::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0),
        Bounds3::new(0.0, 100.0, 0.0, 1.0, 0.0, 0.01),
        Bounds3::new(-5.0, 5.0, 2.0, 3.0, 22.0, 27.0),
        Bounds3::new(2.0, 17.0, 2.0, 22.0, 22.0, 27.0),
    ];

    for b in boxes {
        for target in [1, 7, 1_000, 10_000, 500_000] {
            let g = GridGeometry::for_budget(&b, target).unwrap();
            assert!(g.dims.iter().all(|&n| n >= 2), "{:?} for {target}", g.dims);
        }
    }
}

#[test]
fn test_cell_count_tracks_budget() {
    let b = Bounds3::new(2.0, 17.0, 2.0, 22.0, 22.0, 27.0);
    for target in [10_000i64, 100_000, 500_000, 2_000_000] {
        let g = GridGeometry::for_budget(&b, target).unwrap();
        let ratio = g.cell_count() as f64 / target as f64;
        // ceil on each axis can only add cells, and adds less at larger budgets
        assert!((0.99..1.5).contains(&ratio), "target {target}, ratio {ratio}");
    }
}

#[test]
fn test_spacing_spans_extents() {
    let b = Bounds3::new(2.0, 17.0, 2.0, 22.0, 22.0, 27.0);
    let g = GridGeometry::for_budget(&b, 50_000).unwrap();
    let ext = b.extents();
    for axis in 0..3 {
        assert_approx_eq!(g.spacing[axis] * (g.dims[axis] - 1) as f64, ext[axis], 1e-9);
    }
    assert_eq!(g.origin, [2.0, 2.0, 22.0]);
}

#[test]
fn test_degenerate_budget_and_volume() {
    let flat = Bounds3::new(0.0, 1.0, 0.0, 1.0, 3.0, 3.0);
    assert!(matches!(
        GridGeometry::for_budget(&flat, 1000),
        Err(PipelineError::DegenerateGrid { .. })
    ));

    let cube = Bounds3::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0);
    assert!(matches!(
        GridGeometry::for_budget(&cube, 0),
        Err(PipelineError::DegenerateGrid { target_cells: 0, .. })
    ));
    assert!(GridGeometry::for_budget(&cube, -5).is_err());
}

// ============================================================================
// Resampling
// ============================================================================

#[test]
fn test_matching_spacing_is_near_identity() {
    let bounds = Bounds3::new(0.0, 4.0, 0.0, 4.0, 0.0, 4.0);
    let synthetic = SyntheticMesh::structured(bounds, [5, 5, 5])
        .with_point_field("f", linear_field(0.5, -1.25, 2.0, 3.0));
    let expected = synthetic.point_values("f").to_vec();
    let mesh = to_tet_mesh(synthetic);

    let grid = resample(&mesh, &expected, &mesh.bounds(), 64).unwrap();
    assert_eq!(grid.dims, [5, 5, 5]);
    assert_eq!(grid.spacing, [1.0, 1.0, 1.0]);
    for (got, want) in grid.values.iter().zip(&expected) {
        assert_approx_eq!(*got, *want, 1e-9);
    }
}

#[test]
fn test_linear_field_reproduced_at_any_resolution() {
    let bounds = Bounds3::new(-2.0, 3.0, 0.0, 1.5, 10.0, 12.0);
    let f = linear_field(1.0, 2.0, -0.5, 0.25);
    let synthetic = SyntheticMesh::structured(bounds, [6, 4, 3]).with_point_field("f", &f);
    let values = synthetic.point_values("f").to_vec();
    let mesh = to_tet_mesh(synthetic);

    let grid = resample(&mesh, &values, &bounds, 2_000).unwrap();
    let [nx, ny, nz] = grid.dims;
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let p = grid.point(i, j, k);
                assert_approx_eq!(grid.value(i, j, k), f(p), 1e-9);
            }
        }
    }
}

#[test]
fn test_points_outside_mesh_are_nan_then_cleaned() {
    let mesh_bounds = Bounds3::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0);
    let synthetic = SyntheticMesh::structured(mesh_bounds, [3, 3, 3])
        .with_point_field("f", linear_field(1.0, 0.0, 0.0, 0.0));
    let values = synthetic.point_values("f").to_vec();
    let mesh = to_tet_mesh(synthetic);

    // resample a box twice as wide as the mesh along x
    let wide = Bounds3::new(0.0, 2.0, 0.0, 1.0, 0.0, 1.0);
    let grid = resample(&mesh, &values, &wide, 200).unwrap();
    let nan = grid.values.iter().filter(|v| v.is_nan()).count();
    assert!(nan > 0);

    let cleaned = clean(grid.values, &values);
    assert_eq!(cleaned.nan_count, nan);
    assert!(cleaned.values.iter().all(|v| v.is_finite()));
    // every filled sample lies below the source range
    let filled = cleaned.values.iter().filter(|v| **v < -0.5).count();
    assert_eq!(filled, nan);
}

// ============================================================================
// Cleanup properties
// ============================================================================

#[test]
fn test_cleanup_threshold_replacement() {
    let (a, b) = (-0.189, 4.970);
    let buffer = 0.1 * (b - a);
    let source = [a, 1.0, 2.5, b];
    let resampled = vec![
        a - buffer - 0.01,
        a - buffer + 0.01,
        b + buffer - 0.01,
        b + buffer + 0.01,
        2.0,
    ];

    let out = clean(resampled, &source);
    assert_eq!(out.range_count, 2);
    assert_approx_eq!(out.values[0], a - 1.0, 1e-12);
    assert_approx_eq!(out.values[1], a - buffer + 0.01, 1e-12);
    assert_approx_eq!(out.values[2], b + buffer - 0.01, 1e-12);
    assert_approx_eq!(out.values[3], a - 1.0, 1e-12);
    assert_eq!(out.values[4], 2.0);
}

#[test]
fn test_cleanup_leaves_no_non_finite() {
    let source = [0.0, 1.0];
    let resampled = vec![
        f64::NAN,
        f64::INFINITY,
        0.5,
        f64::NEG_INFINITY,
        f64::NAN,
        0.25,
    ];
    let out = clean(resampled, &source);
    assert_eq!(out.nan_count, 4);
    assert!(out.values.iter().all(|v| v.is_finite()));
}
