//! Tests for 3D bounds and their use in grid sizing.

use resvis_common::{Bounds3, BoundsParseError, UniformGrid};

// ============================================================================
// from_arg_string tests
// ============================================================================

#[test]
fn test_parse_bounds_floating() {
    let b = Bounds3::from_arg_string("-1.5,2.25,0,10,-30.125,-20").unwrap();
    assert!((b.min_x - (-1.5)).abs() < 1e-12);
    assert!((b.max_x - 2.25).abs() < 1e-12);
    assert!((b.min_z - (-30.125)).abs() < 1e-12);
    assert_eq!(b.max_z, -20.0);
}

#[test]
fn test_parse_bounds_wrong_count() {
    let err = Bounds3::from_arg_string("0,1,0,1").unwrap_err();
    assert!(matches!(err, BoundsParseError::InvalidFormat(_)));
}

#[test]
fn test_parse_bounds_bad_number() {
    let err = Bounds3::from_arg_string("0,1,0,one,0,1").unwrap_err();
    match err {
        BoundsParseError::InvalidNumber(s) => assert_eq!(s, "one"),
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// geometry tests
// ============================================================================

#[test]
fn test_inverted_box_has_negative_volume() {
    let b = Bounds3::new(5.0, 0.0, 0.0, 1.0, 0.0, 1.0);
    assert!(b.volume() < 0.0);
}

#[test]
fn test_touching_boxes_do_not_intersect() {
    let a = Bounds3::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0);
    let b = Bounds3::new(1.0, 2.0, 0.0, 1.0, 0.0, 1.0);
    assert!(a.intersection(&b).is_none());
}

#[test]
fn test_contains_point_on_boundary() {
    let b = Bounds3::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0);
    assert!(b.contains_point([1.0, 0.0, 0.5]));
    assert!(!b.contains_point([1.0001, 0.0, 0.5]));
}

#[test]
fn test_grid_bounds_roundtrip() {
    let grid = UniformGrid::new([16, 21, 6], [1.0, 1.0, 1.0], [2.0, 2.0, 22.0]);
    assert_eq!(grid.bounds(), Bounds3::new(2.0, 17.0, 2.0, 22.0, 22.0, 27.0));
}
