//! Tests for frame discovery on real directories.

use test_utils::{frames, FrameDir};
use volume_pipeline::{FrameCatalog, PipelineError};

// ============================================================================
// Discovery tests
// ============================================================================

#[test]
fn test_discover_numeric_order() {
    let dir = FrameDir::new();
    dir.touch_all(&frames::UNSORTED_NAMES);

    let catalog = FrameCatalog::discover(dir.path(), "dcinv", "vtk").unwrap();
    assert_eq!(catalog.indices(), vec![1, 2, 10]);
    assert_eq!(catalog.index_range(), Some((1, 10)));
    assert_eq!(catalog.get(10).unwrap().file_name(), "dcinv_10.vtk");
}

#[test]
fn test_discover_ignores_non_matching() {
    let dir = FrameDir::new();
    dir.touch_all(&[
        "dcinv_3.vtk",
        "dcinv_4.vtu",
        "other_5.vtk",
        "dcinv_final.vtk",
        "dcinv_6.vtk.bak",
        "README.md",
    ]);
    std::fs::create_dir(dir.path().join("dcinv_7.vtk")).unwrap();

    let catalog = FrameCatalog::discover(dir.path(), "dcinv", "vtk").unwrap();
    assert_eq!(catalog.indices(), vec![3]);
}

#[test]
fn test_discover_prefixed_run_names() {
    let dir = FrameDir::new();
    dir.touch_all(&["dcinv_run2_005.vtk", "dcinv_run2_012.vtk", "dcinv_run2_1.vtk"]);

    let catalog = FrameCatalog::discover(dir.path(), "dcinv", "vtk").unwrap();
    assert_eq!(catalog.indices(), vec![1, 5, 12]);
}

#[test]
fn test_discover_empty_directory() {
    let dir = FrameDir::new();
    let catalog = FrameCatalog::discover(dir.path(), "dcinv", "vtk").unwrap();
    assert!(catalog.is_empty());
    assert!(catalog.first().is_none());
    assert_eq!(catalog.index_range(), None);
}

#[test]
fn test_discover_missing_directory() {
    let dir = FrameDir::new();
    let missing = dir.path().join("does-not-exist");
    let result = FrameCatalog::discover(&missing, "dcinv", "vtk");
    assert!(matches!(result, Err(PipelineError::Io(_))));
}

#[test]
fn test_iter_follows_index_order() {
    let dir = FrameDir::new();
    dir.touch_all(&["dcinv_20.json", "dcinv_3.json", "dcinv_100.json"]);

    let catalog = FrameCatalog::discover(dir.path(), "dcinv", "json").unwrap();
    let order: Vec<u64> = catalog.iter().map(|f| f.index).collect();
    assert_eq!(order, vec![3, 20, 100]);
}
