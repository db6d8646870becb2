//! Tests for range tracking, transfer functions and isovalue selection.

use test_utils::{assert_approx_eq, ranges};
use volume_pipeline::isosurface::{plan_layers, select_isovalues};
use volume_pipeline::{
    build_color, build_opacity, IsosurfaceMode, IsosurfaceSpec, OpacityChannels, OpacityPreset,
    Palette, Provenance, RangeTracker, ScalarSelection, ValueRange,
};

fn auto() -> ValueRange {
    ValueRange::auto(ranges::AUTO.0, ranges::AUTO.1)
}

// ============================================================================
// Range tracker
// ============================================================================

#[test]
fn test_tracker_scenario() {
    let sel = ScalarSelection::point(ranges::SCALAR);
    let mut tracker = RangeTracker::new();

    let r = tracker.update(&sel, ranges::AUTO, None);
    assert_eq!(r.provenance, Provenance::Auto);

    // edits within ±0.001 of the auto range stay auto
    for edit in [(-0.1895, 4.9705), (-0.1885, 4.9695), (-0.189, 4.970)] {
        let r = tracker.update(&sel, ranges::AUTO, Some(edit));
        assert_eq!(r.provenance, Provenance::Auto, "edit {edit:?}");
        assert_eq!((r.min, r.max), ranges::AUTO);
        assert_eq!(tracker.displayed(), Some(ranges::AUTO));
    }

    // a real edit sticks across frames
    for _ in 0..5 {
        let r = tracker.update(&sel, ranges::AUTO, Some(ranges::MANUAL));
        assert_eq!(r.provenance, Provenance::Manual);
        assert_eq!((r.min, r.max), ranges::MANUAL);
    }

    // until the selection changes
    let other = ScalarSelection::cell("Resistivity");
    let r = tracker.update(&other, (1.0, 2.0), Some(ranges::MANUAL));
    assert_eq!(r.provenance, Provenance::Auto);
    assert_eq!((r.min, r.max), (1.0, 2.0));
}

// ============================================================================
// Opacity presets
// ============================================================================

#[test]
fn test_linear_up_nine_channels() {
    let samples = OpacityPreset::LinearUp.samples(9);
    assert_eq!(
        samples,
        vec![0.0, 0.125, 0.25, 0.375, 0.5, 0.625, 0.75, 0.875, 1.0]
    );
}

#[test]
fn test_max_middle_nine_channels() {
    let samples = OpacityPreset::MaxMiddle.samples(9);
    assert_eq!(samples[4], 1.0);
    assert_eq!(samples[0], 0.0);
    assert_eq!(samples[8], 0.0);
    for i in 0..4 {
        assert_approx_eq!(samples[i], samples[8 - i], 1e-12);
        assert!(samples[i] < samples[i + 1]);
    }
}

#[test]
fn test_preset_channels_build_opacity() {
    let channels = OpacityChannels::from_preset(OpacityPreset::LinearUp, 9).unwrap();
    let tf = build_opacity(&auto(), &channels);
    assert_eq!(tf.points.len(), 9);
    assert_eq!(tf.points[0].value, ranges::AUTO.0);
    assert_approx_eq!(tf.points[8].value, ranges::AUTO.1, 1e-12);
    assert_approx_eq!(tf.opacity_at(auto().at_fraction(0.5)), 0.5, 1e-12);
}

// ============================================================================
// Color transfer functions
// ============================================================================

#[test]
fn test_every_palette_covers_range() {
    for palette in Palette::ALL {
        let tf = build_color(&auto(), palette);
        assert!(tf.points.len() >= 2, "{palette}");
        assert_eq!(tf.points[0].value, ranges::AUTO.0);
        assert_approx_eq!(tf.points.last().unwrap().value, ranges::AUTO.1, 1e-12);
        assert!(tf.points.windows(2).all(|w| w[0].value <= w[1].value));
    }
}

#[test]
fn test_unknown_palette_uses_default() {
    let tf = build_color(&auto(), Palette::from_name("no-such-palette"));
    let default = build_color(&auto(), Palette::default());
    assert_eq!(tf, default);
}

// ============================================================================
// Isovalues
// ============================================================================

#[test]
fn test_five_interior_isovalues() {
    let spec = IsosurfaceSpec {
        mode: IsosurfaceMode::Multiple,
        count: 5,
        ..IsosurfaceSpec::default()
    };
    let values = select_isovalues(&spec, &auto());
    assert_eq!(values.len(), 5);
    assert!(values
        .iter()
        .all(|&v| v > ranges::AUTO.0 && v < ranges::AUTO.1));

    let gaps: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    for gap in &gaps {
        assert_approx_eq!(*gap, gaps[0], 1e-12);
    }
    assert_approx_eq!(values[0] - ranges::AUTO.0, gaps[0], 1e-12);
}

#[test]
fn test_single_layer_keeps_opacity() {
    let layers = plan_layers(&IsosurfaceSpec::default(), &auto());
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].value, 2.0);
    assert_eq!(layers[0].opacity, 0.5);
}
