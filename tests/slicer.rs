use seriesalign::data::slicer::{
    find_end, find_start, slice_by_index, slice_by_value, CutMode, CutRange,
};

/// Linear-scan reference for a half-open value window.
fn scan(x: &[f64], lo: f64, hi: f64) -> Vec<usize> {
    (0..x.len()).filter(|&i| x[i] >= lo && x[i] < hi).collect()
}

#[test]
fn value_slice_matches_linear_scan() {
    let x = [0.0, 1.0, 1.0, 2.0, 3.5, 3.5, 3.5, 7.0, 9.0];
    let windows = [
        (-5.0, 100.0),
        (1.0, 3.5),
        (1.0, 1.0),
        (3.5, 9.0),
        (3.5, 9.5),
        (8.0, 8.5),
        (10.0, 20.0),
        (-3.0, -1.0),
        (2.5, 1.0),
    ];
    for (lo, hi) in windows {
        let r = slice_by_value(&x, lo, hi);
        let expected = scan(&x, lo, hi);
        let got: Vec<usize> = r.clone().collect();
        assert_eq!(got, expected, "window [{lo}, {hi}) on {x:?}");
    }
}

#[test]
fn half_open_upper_bound_excludes_equal_samples() {
    // x = [0, 1, 2, 3, 4], cut [1, 3) keeps 1 and 2
    let x = [0.0, 1.0, 2.0, 3.0, 4.0];
    assert_eq!(slice_by_value(&x, 1.0, 3.0), 1..3);
    assert_eq!(find_start(&x, 1.0), 1);
    assert_eq!(find_end(&x, 3.0), 3);
}

#[test]
fn empty_and_degenerate_inputs() {
    assert_eq!(slice_by_value(&[], 0.0, 1.0), 0..0);
    let dup = [2.0; 6];
    assert_eq!(slice_by_value(&dup, 2.0, 2.5), 0..6, "all duplicates inside");
    assert_eq!(slice_by_value(&dup, 0.0, 2.0), 0..0, "upper equal to every sample");
    assert!(slice_by_value(&dup, f64::NAN, 3.0).is_empty());
    assert!(slice_by_value(&dup, 0.0, f64::NAN).is_empty());
}

#[test]
fn index_slice_clamps_and_floors() {
    assert_eq!(slice_by_index(10, 2.0, 5.0), 2..5);
    assert_eq!(slice_by_index(10, 2.7, 5.9), 2..5);
    assert_eq!(slice_by_index(10, -4.0, 50.0), 0..10);
    assert_eq!(slice_by_index(10, 8.0, 3.0), 8..8, "inverted bounds are empty");
    assert_eq!(slice_by_index(0, 0.0, 5.0), 0..0);
}

#[test]
fn cut_range_resolves_by_mode() {
    let x = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
    let disabled = CutRange::default();
    assert_eq!(disabled.resolve(&x, CutMode::Time), 0..6);
    assert_eq!(disabled.span(), None);

    let cut = CutRange::new(1.0, 3.0);
    assert_eq!(cut.resolve(&x, CutMode::Index), 1..3);
    assert_eq!(cut.resolve(&x, CutMode::Time), 0..0, "no x below 3");

    let cut = CutRange::new(11.0, 14.0);
    assert_eq!(cut.resolve(&x, CutMode::Time), 1..4);
    assert_eq!(cut.span(), Some((11.0, 14.0)));
}

#[test]
fn cut_mode_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&CutMode::Time).unwrap(), "\"time\"");
    let cut: CutRange = serde_json::from_str(r#"{"start":1,"end":2,"enabled":true}"#).unwrap();
    assert_eq!(cut, CutRange::new(1.0, 2.0));
}
