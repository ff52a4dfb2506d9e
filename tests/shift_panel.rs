use serde_json::json;

use seriesalign::backend::api::{RawSeries, SeriesMap};
use seriesalign::panels::{Panel, ShiftPanel, UiAction};
use seriesalign::{AlignState, AlignerConfig};

fn loaded_state(n: usize) -> AlignState {
    let mut state = AlignState::new(&AlignerConfig::default());
    let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let y = vec![0.0; n];
    let series: SeriesMap = [("s".to_string(), RawSeries { x, y })].into_iter().collect();
    state.load_series(series);
    state
}

fn idle_frame(ctx: &egui::Context, panel: &mut ShiftPanel, state: &mut AlignState) -> Vec<UiAction> {
    let mut actions = Vec::new();
    let _ = ctx.run(egui::RawInput::default(), |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            panel.render_panel(ui, state, &mut actions);
        });
    });
    actions
}

#[test]
fn idle_frames_keep_shifts_beyond_the_ui_limit() {
    let mut state = loaded_state(1000);
    assert_eq!(state.shift_bounds().limit, 1498.5);
    state.set_manual_offset("s", 5000.0);

    let ctx = egui::Context::default();
    let mut panel = ShiftPanel::default();
    let actions = idle_frame(&ctx, &mut panel, &mut state);
    assert!(actions.is_empty());
    assert_eq!(state.manual_offsets().get("s"), 5000.0, "repaint must not clamp");

    // zooming in shrinks the limit; the stored shift stays as it is
    state.handle_relayout_payload(&json!({"xaxis.range": [10.0, 20.0]}));
    assert!(state.shift_bounds().limit < 5000.0);
    idle_frame(&ctx, &mut panel, &mut state);
    idle_frame(&ctx, &mut panel, &mut state);
    assert_eq!(state.manual_offsets().get("s"), 5000.0);
}
