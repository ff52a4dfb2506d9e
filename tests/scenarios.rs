use serde_json::json;

use seriesalign::backend::api::{AlignResponse, RawSeries, SeriesMap, UploadResponse};
use seriesalign::data::datasets::Dataset;
use seriesalign::data::offsets::ShiftMode;
use seriesalign::data::series::ChannelKey;
use seriesalign::data::slicer::CutRange;
use seriesalign::data::window_cache::WindowOutcome;
use seriesalign::state::{NoticeLevel, Selection, ViewMode};
use seriesalign::{AlignError, AlignState, AlignerConfig};

fn raw(x: Vec<f64>) -> RawSeries {
    let y = x.iter().map(|v| v.sin()).collect();
    RawSeries { x, y }
}

fn index_series(n: usize) -> RawSeries {
    raw((0..n).map(|i| i as f64).collect())
}

fn series_map(entries: &[(&str, RawSeries)]) -> SeriesMap {
    entries
        .iter()
        .map(|(id, r)| (id.to_string(), r.clone()))
        .collect()
}

fn dataset(id: &str, large: bool) -> Dataset {
    let rows = if large { 2_000_000 } else { 100 };
    serde_json::from_value(json!({
        "id": id,
        "name": format!("{id}.csv"),
        "filename": format!("{id}.csv"),
        "isLargeFile": large,
        "totalRows": rows,
        "timeRange": [0.0, 100.0],
        "channels": ["pressure", "flow"],
    }))
    .unwrap()
}

fn state() -> AlignState {
    AlignState::new(&AlignerConfig::default())
}

#[test]
fn cut_then_shift_renders_expected_window() {
    let mut st = state();
    st.load_series(series_map(&[("s", index_series(100)), ("t", index_series(100))]));
    st.move_series("t", "Abnormal").unwrap();

    st.begin_group_alignment().unwrap();
    let resp = AlignResponse::Offsets {
        offsets: [("s".to_string(), 5.0)].into_iter().collect(),
    };
    assert_eq!(st.finish_alignment(Ok(resp)).unwrap(), 1);

    st.set_manual_offset("s", 2.0);
    st.set_cut(CutRange::new(10.0, 20.0));

    let trace = st.render_series("s").unwrap();
    let expected: Vec<f64> = (17..27).map(f64::from).collect();
    assert_eq!(trace.x.as_ref(), expected.as_slice());
    assert_eq!(trace.y.len(), 10);
    assert_eq!(trace.shift, 7.0);
}

#[test]
fn group_shift_moves_only_that_group() {
    let mut st = state();
    st.load_series(series_map(&[("S1", index_series(10)), ("S2", index_series(10))]));
    st.move_series("S1", "Normal").unwrap();
    st.move_series("S2", "Abnormal").unwrap();
    assert!(st.set_shift_mode(ShiftMode::Group));
    st.set_manual_offset("Abnormal", 50.0);

    let s1 = st.render_series("S1").unwrap();
    let s2 = st.render_series("S2").unwrap();
    assert_eq!(s1.x[0], 0.0);
    assert_eq!(s2.x[0], 50.0);
    assert_eq!(s2.x[9], 59.0);
}

#[test]
fn format_error_registers_nothing() {
    let mut st = state();
    st.replace_datasets(vec![dataset("d1", false)]);
    let body: UploadResponse = serde_json::from_value(json!({
        "error": true,
        "formatError": true,
        "message": "header must start with a time column",
    }))
    .unwrap();

    let err = st.register_upload(body).unwrap_err();
    assert!(matches!(err, AlignError::Format { .. }));
    assert_eq!(st.datasets().len(), 1);
    assert_eq!(st.notifications().latest().unwrap().level, NoticeLevel::Error);
}

#[test]
fn autorange_restores_selected_extent() {
    let mut st = state();
    st.load_series(series_map(&[("a", raw(vec![3.0, 4.0, 8.0]))]));
    assert_eq!(st.selection(), Some(&Selection::Series("a".to_string())));

    st.handle_relayout_payload(&json!({"xaxis.range[0]": 4.0, "xaxis.range[1]": 5.0}));
    assert_eq!(st.viewport().effective_range(), Some((4.0, 5.0)));
    st.handle_relayout_payload(&json!({"xaxis.autorange": true}));
    assert_eq!(st.viewport().visible_range(), None);
    assert_eq!(st.viewport().effective_range(), Some((3.0, 8.0)));
}

#[test]
fn upload_of_multi_channel_file_registers_dataset() {
    let mut st = state();
    let body: UploadResponse = serde_json::from_value(json!({
        "id": "d7",
        "name": "run 7",
        "filename": "run7.csv",
        "isLargeFile": false,
        "totalRows": 3,
        "timeRange": [0.0, 2.0],
        "channels": ["a", "b"],
    }))
    .unwrap();
    let ds = st.register_upload(body).unwrap().unwrap();
    assert_eq!(ds.id, "d7");
    assert_eq!(st.active_channel(), Some("a"));
    assert_eq!(st.reference_dataset(), Some("d7"));
    assert_eq!(st.datasets_needing_data(), vec!["d7".to_string()]);

    let data = [
        ("a".to_string(), raw(vec![0.0, 1.0, 2.0])),
        ("b".to_string(), raw(vec![0.0, 1.0, 2.0])),
    ]
    .into_iter()
    .collect();
    assert_eq!(st.load_dataset_data("d7", data).unwrap(), 2);
    assert!(st.datasets_needing_data().is_empty());
}

#[test]
fn large_dataset_is_displayed_within_budget() {
    let mut st = state();
    st.replace_datasets(vec![dataset("big", true), dataset("small", false)]);
    st.set_view(ViewMode::Datasets);
    assert_eq!(st.active_channel(), Some("pressure"));

    let requests = st.pending_window_requests();
    assert_eq!(requests.len(), 1, "only the large dataset is windowed");
    let req = requests[0].clone();
    assert_eq!(req.key, ChannelKey::new("big", "pressure"));
    assert!(st.pending_window_requests().is_empty(), "no refetch without changes");

    let huge = raw((0..200_000).map(|i| i as f64 * 0.0005).collect());
    assert_eq!(st.complete_window(&req, Ok(huge)), WindowOutcome::Applied);
    let trace = st.render_channel(&req.key).unwrap();
    assert!(trace.x.len() <= st.target_points());
    assert!(!trace.loading);
}

#[test]
fn zoom_in_dataset_view_requests_unshifted_window() {
    let mut st = state();
    st.replace_datasets(vec![dataset("big", true)]);
    st.set_view(ViewMode::Datasets);
    let first = st.pending_window_requests().remove(0);
    st.complete_window(&first, Ok(raw(vec![0.0, 50.0, 100.0])));

    st.set_shift_mode(ShiftMode::Dataset);
    st.set_manual_offset("big", 10.0);
    st.handle_relayout_payload(&json!({"xaxis.range": [30.0, 40.0]}));
    assert_eq!(
        st.channel_window(&first.key),
        Some((20.0, 30.0)),
        "visible range is mapped back into raw time"
    );

    let next = st.pending_window_requests();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].span, Some((20.0, 30.0)));
    assert!(next[0].epoch > first.epoch);

    st.handle_relayout_payload(&json!({"xaxis.autorange": true}));
    assert_eq!(st.channel_window(&first.key), None);
}

#[test]
fn failed_window_only_affects_its_channel() {
    let mut st = state();
    st.replace_datasets(vec![dataset("big1", true), dataset("big2", true)]);
    st.set_view(ViewMode::Datasets);
    let reqs = st.pending_window_requests();
    assert_eq!(reqs.len(), 2);

    st.complete_window(&reqs[0], Ok(raw(vec![0.0, 1.0])));
    let outcome = st.complete_window(&reqs[1], Err(AlignError::Network("500".to_string())));
    assert_eq!(outcome, WindowOutcome::Failed);

    assert_eq!(st.render_channel(&reqs[0].key).unwrap().x.len(), 2);
    let failed = st.render_channel(&reqs[1].key).unwrap();
    assert!(failed.x.is_empty());
    assert!(failed.error.is_some());
    let notice = st.notifications().latest().unwrap();
    assert!(notice.message.contains("big2/pressure"));
}

#[test]
fn invalid_series_are_skipped_and_reported() {
    let mut st = state();
    let bad = RawSeries { x: vec![0.0, 1.0], y: vec![1.0] };
    st.load_series(series_map(&[("ok", index_series(3)), ("bad", bad)]));
    assert_eq!(st.store().ids(), ["ok".to_string()]);
    assert_eq!(st.notifications().latest().unwrap().level, NoticeLevel::Error);
}

#[test]
fn clear_all_keeps_groups() {
    let mut st = state();
    st.add_group("Faulty").unwrap();
    st.load_series(series_map(&[("a", index_series(5))]));
    st.move_series("a", "Faulty").unwrap();
    st.set_manual_offset("a", 3.0);

    st.clear_all(4);
    assert!(st.store().is_empty());
    assert!(st.grouping().contains("Faulty"));
    assert_eq!(st.grouping().group_of("a"), None);
    assert_eq!(st.manual_offsets().get("a"), 0.0);
    assert!(st.selection().is_none());
    assert!(st.notifications().latest().unwrap().message.contains('4'));
}

#[test]
fn rejected_rename_is_reverted() {
    let mut st = state();
    st.replace_datasets(vec![dataset("d1", false)]);
    let previous = st.rename_dataset("d1", "renamed").unwrap();
    assert_eq!(st.datasets().get("d1").unwrap().name, "renamed");

    st.finish_rename("d1", &previous, Err(AlignError::Network("409".to_string())));
    assert_eq!(st.datasets().get("d1").unwrap().name, "d1.csv");
    assert!(st.rename_dataset("nope", "x").is_err());
}

#[test]
fn deleting_a_group_drops_its_shift() {
    let mut st = state();
    st.add_group("Extra").unwrap();
    st.load_series(series_map(&[("a", index_series(5))]));
    st.move_series("a", "Extra").unwrap();
    st.set_shift_mode(ShiftMode::Group);
    st.set_manual_offset("Extra", 9.0);

    assert_eq!(st.delete_group("Extra").unwrap(), "Normal");
    assert_eq!(st.grouping().group_of("a"), Some("Normal"));
    assert_eq!(st.render_series("a").unwrap().shift, 0.0);
}

#[test]
fn view_switch_keeps_shift_mode_meaningful() {
    let mut st = state();
    st.set_shift_mode(ShiftMode::Group);
    st.set_view(ViewMode::Datasets);
    assert_eq!(st.manual_offsets().mode(), ShiftMode::SingleSeries);
}

#[test]
fn autorange_on_large_channel_restores_full_extent() {
    let mut st = state();
    st.replace_datasets(vec![dataset("big", true)]);
    st.set_view(ViewMode::Datasets);
    let whole = st.pending_window_requests().remove(0);
    st.complete_window(&whole, Ok(raw(vec![0.0, 50.0, 100.0])));
    assert_eq!(st.viewport().effective_range(), Some((0.0, 100.0)));

    st.handle_relayout_payload(&json!({"xaxis.range": [20.0, 30.0]}));
    let zoomed = st.pending_window_requests().remove(0);
    assert_eq!(
        st.complete_window(&zoomed, Ok(raw(vec![20.0, 25.0, 30.0]))),
        WindowOutcome::Applied
    );

    st.handle_relayout_payload(&json!({"xaxis.autorange": true}));
    assert_eq!(
        st.viewport().effective_range(),
        Some((0.0, 100.0)),
        "extent comes from the dataset, not the last window"
    );

    let refetch = st.pending_window_requests().remove(0);
    st.complete_window(&refetch, Err(AlignError::Network("502".to_string())));
    assert_eq!(st.viewport().effective_range(), Some((0.0, 100.0)));
    assert!(st.shift_bounds().limit >= 150.0);
}

#[test]
fn refetch_forgets_vanished_series() {
    let mut st = state();
    st.load_series(series_map(&[("a", index_series(5)), ("b", index_series(5))]));
    st.move_series("b", "Abnormal").unwrap();
    st.set_manual_offset("b", 4.0);

    st.load_series(series_map(&[("a", index_series(5))]));
    assert_eq!(st.store().ids(), ["a".to_string()]);
    assert_eq!(st.grouping().group_of("b"), None);
    assert_eq!(st.manual_offsets().get("b"), 0.0);
    assert_eq!(st.grouping().group_of("a"), Some("Normal"));
}

#[test]
fn revert_of_a_vanished_dataset_is_reported_only() {
    let mut st = state();
    st.replace_datasets(vec![dataset("d1", false)]);
    let previous = st.rename_dataset("d1", "renamed").unwrap();
    st.replace_datasets(Vec::new());

    st.finish_rename("d1", &previous, Err(AlignError::Network("404".to_string())));
    assert!(st.datasets().is_empty());
    assert_eq!(st.notifications().latest().unwrap().level, NoticeLevel::Error);
}
