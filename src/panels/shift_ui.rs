use egui::{RichText, Ui};

use super::panel_trait::{Panel, PanelState, UiAction};
use crate::data::offsets::ShiftMode;
use crate::data::slicer::{CutMode, CutRange};
use crate::data::viewport::{RelayoutEvent, ShiftBounds};
use crate::state::{AlignState, ViewMode};

pub struct ShiftPanel {
    pub state: PanelState,
}

impl Default for ShiftPanel {
    fn default() -> Self {
        Self {
            state: PanelState::new("Alignment", "⇔"),
        }
    }
}

/// (manual-table key, label, auto offset) for every control of the active mode.
fn shift_targets(state: &AlignState) -> Vec<(String, String, f64)> {
    let auto = state.auto_offsets();
    match (state.view(), state.manual_offsets().mode()) {
        (ViewMode::Series, ShiftMode::SingleSeries) => state
            .store()
            .ids()
            .iter()
            .map(|id| (id.clone(), id.clone(), auto.series(id)))
            .collect(),
        (ViewMode::Series, ShiftMode::Group) => state
            .grouping()
            .groups()
            .iter()
            .map(|g| (g.name.clone(), g.name.clone(), 0.0))
            .collect(),
        (ViewMode::Datasets, ShiftMode::SingleSeries) => {
            let Some(channel) = state.active_channel() else {
                return Vec::new();
            };
            state
                .datasets()
                .iter()
                .filter(|d| d.has_channel(channel))
                .map(|d| {
                    let key = d.channel_key(channel);
                    (key.to_string(), d.name.clone(), auto.dataset(&d.id))
                })
                .collect()
        }
        (ViewMode::Datasets, ShiftMode::Dataset) => state
            .datasets()
            .iter()
            .map(|d| (d.id.clone(), d.name.clone(), auto.dataset(&d.id)))
            .collect(),
        _ => Vec::new(),
    }
}

fn cut_editor(ui: &mut Ui, cut: &mut CutRange, bounds: ShiftBounds, id: &str) -> bool {
    let mut changed = false;
    ui.push_id(id, |ui| {
        changed |= ui.checkbox(&mut cut.enabled, "Cut range").changed();
        ui.add_enabled_ui(cut.enabled, |ui| {
            ui.horizontal(|ui| {
                ui.label("from");
                changed |= ui
                    .add(egui::DragValue::new(&mut cut.start).speed(bounds.step))
                    .changed();
                ui.label("to");
                changed |= ui
                    .add(egui::DragValue::new(&mut cut.end).speed(bounds.step))
                    .changed();
            });
        });
    });
    changed
}

impl Panel for ShiftPanel {
    fn state(&self) -> &PanelState {
        &self.state
    }
    fn state_mut(&mut self) -> &mut PanelState {
        &mut self.state
    }

    fn render_panel(&mut self, ui: &mut Ui, state: &mut AlignState, actions: &mut Vec<UiAction>) {
        let bounds = state.shift_bounds();

        // ── Alignment run ────────────────────────────────────────────────
        ui.horizontal(|ui| {
            let busy = state.alignment().is_in_progress();
            if ui
                .add_enabled(!busy, egui::Button::new("⚡ Align"))
                .on_hover_text("Compute offsets against the reference")
                .clicked()
            {
                actions.push(UiAction::Align);
            }
            if busy {
                ui.spinner();
            }
            if ui.button("Clear alignment").clicked() {
                state.clear_alignment();
            }
            if ui.button("Reset view").clicked() {
                state.reset_view();
            }
        });

        // ── Cut ──────────────────────────────────────────────────────────
        ui.separator();
        match state.view() {
            ViewMode::Series => {
                let mut mode = state.cut_mode();
                ui.horizontal(|ui| {
                    ui.label("Cut by");
                    ui.selectable_value(&mut mode, CutMode::Index, "index");
                    ui.selectable_value(&mut mode, CutMode::Time, "time");
                });
                state.set_cut_mode(mode);
                let mut cut = state.cut();
                if cut_editor(ui, &mut cut, bounds, "series_cut") {
                    state.set_cut(cut);
                }
            }
            ViewMode::Datasets => {
                let mut cut = state.channel_cut();
                if cut_editor(ui, &mut cut, bounds, "channel_cut") {
                    state.set_channel_cut(cut);
                }
            }
        }

        // ── Manual shifts ────────────────────────────────────────────────
        ui.separator();
        let mut mode = state.manual_offsets().mode();
        ui.horizontal(|ui| {
            ui.selectable_value(&mut mode, ShiftMode::SingleSeries, ShiftMode::SingleSeries.label());
            match state.view() {
                ViewMode::Series => {
                    ui.selectable_value(&mut mode, ShiftMode::Group, ShiftMode::Group.label());
                }
                ViewMode::Datasets => {
                    ui.selectable_value(&mut mode, ShiftMode::Dataset, ShiftMode::Dataset.label());
                }
            }
        });
        state.set_shift_mode(mode);
        ui.label(
            RichText::new(format!("step {} · limit ±{}", bounds.step, bounds.limit))
                .small()
                .weak(),
        );

        let targets = shift_targets(state);
        egui::Grid::new("manual_shifts")
            .num_columns(3)
            .striped(true)
            .show(ui, |ui| {
                for (key, label, auto) in &targets {
                    let mut value = state.manual_offsets().get(key);
                    ui.label(label.as_str());
                    if ui
                        .add(
                            egui::DragValue::new(&mut value)
                                .speed(bounds.step)
                                .range(bounds.range())
                                // limits bound new input only; stored shifts may exceed them
                                .clamp_existing_to_range(false),
                        )
                        .changed()
                    {
                        state.set_manual_offset(key, value);
                    }
                    if *auto != 0.0 {
                        ui.label(RichText::new(format!("auto {auto:+.3}")).small().weak());
                    } else {
                        ui.label("");
                    }
                    ui.end_row();
                }
            });

        // ── Reference lines ──────────────────────────────────────────────
        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Reference lines");
            if ui.small_button("➕").clicked() {
                state.add_reference_line(None);
            }
        });
        let lines = state.viewport().reference_lines().lines().to_vec();
        for (index, line) in lines.iter().enumerate() {
            ui.horizontal(|ui| {
                ui.label(RichText::new("│").color(line.color).strong());
                let mut x = line.x;
                if ui
                    .add(egui::DragValue::new(&mut x).speed(bounds.step))
                    .changed()
                {
                    state.apply_relayout(RelayoutEvent::ShapeMoved { index, x });
                }
                if ui.small_button("✖").clicked() {
                    state.remove_reference_line(line.id);
                }
            });
        }
    }
}
