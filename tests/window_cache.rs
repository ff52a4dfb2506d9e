use seriesalign::data::series::{ChannelKey, Series};
use seriesalign::data::window_cache::{WindowCache, WindowOutcome, WindowParams};
use seriesalign::AlignError;

fn series(n: usize, x0: f64) -> Series {
    let x: Vec<f64> = (0..n).map(|i| x0 + i as f64).collect();
    let y = vec![1.0; n];
    Series::new("w", x, y).unwrap()
}

#[test]
fn only_the_latest_request_is_applied() {
    let mut cache = WindowCache::new(100);
    let key = ChannelKey::new("d1", "ch");

    let first = cache
        .request(&key, WindowParams { cut: None, window: Some((0.0, 50.0)) })
        .unwrap();
    let second = cache
        .request(&key, WindowParams { cut: None, window: Some((10.0, 20.0)) })
        .unwrap();
    assert!(second.epoch > first.epoch);

    // second response arrives first
    assert_eq!(cache.complete(&second, Ok(series(10, 10.0))), WindowOutcome::Applied);
    assert_eq!(cache.complete(&first, Ok(series(50, 0.0))), WindowOutcome::Stale);
    assert_eq!(cache.display(&key).unwrap().x()[0], 10.0, "late stale response ignored");
    assert!(!cache.is_loading(&key));
}

#[test]
fn unchanged_params_do_not_refetch() {
    let mut cache = WindowCache::new(100);
    let key = ChannelKey::new("d1", "ch");
    let params = WindowParams { cut: Some((0.0, 5.0)), window: None };
    assert!(cache.request(&key, params).is_some());
    assert!(cache.request(&key, params).is_none());
    assert!(!cache.needs_fetch(&key, &params));
    let forced = cache.force_request(&key, params);
    assert_eq!(cache.latest_epoch(&key), Some(forced.epoch));
}

#[test]
fn failures_stay_local_to_their_channel() {
    let mut cache = WindowCache::new(100);
    let a = ChannelKey::new("d1", "a");
    let b = ChannelKey::new("d1", "b");
    let ra = cache.request(&a, WindowParams::default()).unwrap();
    let rb = cache.request(&b, WindowParams::default()).unwrap();

    assert_eq!(cache.complete(&ra, Ok(series(20, 0.0))), WindowOutcome::Applied);
    let err = AlignError::Network("boom".to_string());
    assert_eq!(cache.complete(&rb, Err(err)), WindowOutcome::Failed);

    assert_eq!(cache.display(&a).unwrap().len(), 20);
    assert!(cache.display(&b).unwrap().is_empty());
    assert!(cache.error(&b).unwrap().contains("boom"));
    assert!(cache.error(&a).is_none());
}

#[test]
fn buffers_respect_the_point_budget() {
    let mut cache = WindowCache::new(1_000);
    let key = ChannelKey::new("big", "ch");
    let req = cache.request(&key, WindowParams::default()).unwrap();
    assert_eq!(req.target_points, 1_000);
    assert_eq!(req.span, None);
    cache.complete(&req, Ok(series(25_000, 0.0)));
    let shown = cache.display(&key).unwrap();
    assert!(shown.len() <= 1_000, "got {} points", shown.len());
    assert!(shown.len() >= 900);
}

#[test]
fn evicted_keys_never_reuse_epochs() {
    let mut cache = WindowCache::new(100);
    let key = ChannelKey::new("d1", "ch");
    let old = cache.request(&key, WindowParams::default()).unwrap();
    cache.evict_dataset("d1");
    assert_eq!(cache.complete(&old, Ok(series(5, 0.0))), WindowOutcome::Stale);

    let new = cache.request(&key, WindowParams::default()).unwrap();
    assert_ne!(old.epoch, new.epoch);
    assert_eq!(cache.complete(&old, Ok(series(5, 0.0))), WindowOutcome::Stale);
    assert_eq!(cache.complete(&new, Ok(series(5, 0.0))), WindowOutcome::Applied);
}

#[test]
fn cut_and_window_intersect() {
    let both = WindowParams { cut: Some((0.0, 10.0)), window: Some((5.0, 20.0)) };
    assert_eq!(both.span(), Some((5.0, 10.0)));
    let disjoint = WindowParams { cut: Some((0.0, 1.0)), window: Some((5.0, 6.0)) };
    assert_eq!(disjoint.span(), Some((5.0, 5.0)));
    assert_eq!(WindowParams::default().span(), None);
}

#[test]
fn inverted_spans_request_nothing() {
    let cut_only = WindowParams { cut: Some((10.0, 5.0)), window: None };
    assert_eq!(cut_only.span(), Some((10.0, 10.0)));
    let window_only = WindowParams { cut: None, window: Some((8.0, 2.0)) };
    assert_eq!(window_only.span(), Some((8.0, 8.0)));

    let mut cache = WindowCache::new(100);
    let key = ChannelKey::new("big", "ch");
    let req = cache.request(&key, cut_only).unwrap();
    let (lo, hi) = req.span.unwrap();
    assert!(lo <= hi, "backend never sees startTime > endTime");
}
