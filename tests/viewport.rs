use serde_json::json;

use seriesalign::data::viewport::{RelayoutEvent, ShiftBoundsConfig, ViewportController};

#[test]
fn parses_relayout_payloads() {
    assert_eq!(
        RelayoutEvent::parse(&json!({"xaxis.autorange": true})),
        Some(RelayoutEvent::AutoRangeReset)
    );
    assert_eq!(
        RelayoutEvent::parse(&json!({"xaxis.range[0]": 5.0, "xaxis.range[1]": 2.0})),
        Some(RelayoutEvent::RangeChanged { lo: 2.0, hi: 5.0 }),
        "bounds are ordered"
    );
    assert_eq!(
        RelayoutEvent::parse(&json!({"xaxis.range": [1, 3]})),
        Some(RelayoutEvent::RangeChanged { lo: 1.0, hi: 3.0 })
    );
    assert_eq!(
        RelayoutEvent::parse(&json!({"shapes[2].x0": 7.5})),
        Some(RelayoutEvent::ShapeMoved { index: 2, x: 7.5 })
    );
}

#[test]
fn ignores_unknown_or_degenerate_payloads() {
    assert_eq!(RelayoutEvent::parse(&json!({"yaxis.range[0]": 1})), None);
    assert_eq!(RelayoutEvent::parse(&json!({"xaxis.autorange": false})), None);
    assert_eq!(RelayoutEvent::parse(&json!({"xaxis.range": [2, 2]})), None);
    assert_eq!(RelayoutEvent::parse(&json!({"shapes[x].x0": 1})), None);
    assert_eq!(RelayoutEvent::parse(&json!([1, 2])), None);
}

#[test]
fn zoom_then_reset_returns_to_data_range() {
    let mut vp = ViewportController::new(ShiftBoundsConfig::default());
    let x: Vec<f64> = (0..1000).map(f64::from).collect();
    vp.select(Some(x.as_slice()));
    assert_eq!(vp.data_range(), Some((0.0, 999.0)));
    assert_eq!(vp.effective_range(), Some((0.0, 999.0)));

    assert!(vp.apply(RelayoutEvent::RangeChanged { lo: 100.0, hi: 200.0 }));
    assert_eq!(vp.effective_range(), Some((100.0, 200.0)));
    assert!(!vp.apply(RelayoutEvent::RangeChanged { lo: 100.0, hi: 200.0 }));

    assert!(vp.apply(RelayoutEvent::AutoRangeReset));
    assert_eq!(vp.visible_range(), None);
    assert_eq!(vp.effective_range(), Some((0.0, 999.0)));
}

#[test]
fn shift_bounds_follow_range_and_domain() {
    let mut vp = ViewportController::new(ShiftBoundsConfig::default());
    let index: Vec<f64> = (0..1000).map(f64::from).collect();
    vp.select(Some(index.as_slice()));
    // length 999: step = max(1, ceil(9.99)) = 10, limit = max(100, 1498.5)
    let b = vp.shift_bounds();
    assert_eq!(b.step, 10.0);
    assert_eq!(b.limit, 1498.5);

    vp.apply(RelayoutEvent::RangeChanged { lo: 0.0, hi: 50.0 });
    let b = vp.shift_bounds();
    assert_eq!(b.step, 1.0);
    assert_eq!(b.limit, 100.0);

    // time domain uses the finer fraction
    let time: Vec<f64> = (0..100).map(|i| 0.5 + i as f64 * 50.0).collect();
    vp.apply(RelayoutEvent::AutoRangeReset);
    vp.select(Some(time.as_slice()));
    let b = vp.shift_bounds();
    assert_eq!(b.step, (4950.0_f64 * 0.001).ceil());
    assert_eq!(b.limit, 4950.0 * 1.5);
    assert_eq!(b.range(), -b.limit..=b.limit);
}

#[test]
fn no_selection_uses_minimum_bounds() {
    let vp = ViewportController::new(ShiftBoundsConfig::default());
    let b = vp.shift_bounds();
    assert_eq!(b.step, 1.0);
    assert_eq!(b.limit, 100.0);
}

#[test]
fn reference_lines_move_by_shape_index() {
    let mut vp = ViewportController::new(ShiftBoundsConfig::default());
    let first = vp.reference_lines_mut().add(1.0);
    let second = vp.reference_lines_mut().add(2.0);
    assert_ne!(first, second);

    assert!(vp.apply(RelayoutEvent::ShapeMoved { index: 1, x: 9.0 }));
    assert_eq!(vp.reference_lines().lines()[1].x, 9.0);
    assert!(!vp.apply(RelayoutEvent::ShapeMoved { index: 5, x: 0.0 }));

    assert!(vp.reference_lines_mut().remove(first));
    assert_eq!(vp.reference_lines().lines().len(), 1);
    assert_eq!(vp.reference_lines().lines()[0].id, second);
}
