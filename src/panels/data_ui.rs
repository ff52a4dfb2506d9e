use egui::{RichText, Ui};

use super::panel_trait::{Panel, PanelState, UiAction};
use crate::data::series::DatasetId;
use crate::state::{AlignState, Selection, ViewMode};

pub struct DataPanel {
    pub state: PanelState,
    pub multi_channel: bool,
    /// Dataset currently being renamed and the text typed so far.
    editing: Option<(DatasetId, String)>,
}

impl Default for DataPanel {
    fn default() -> Self {
        Self {
            state: PanelState::new("Data", "🗀"),
            multi_channel: false,
            editing: None,
        }
    }
}

impl DataPanel {
    fn render_series_list(&mut self, ui: &mut Ui, state: &mut AlignState) {
        if state.store().ids().is_empty() {
            ui.weak("No series loaded.");
            return;
        }
        let mut selected = state.selection().cloned();
        let ids = state.store().ids();
        egui::ScrollArea::vertical()
            .id_salt("series_list")
            .max_height(220.0)
            .show(ui, |ui| {
                for group in state.grouping().groups() {
                    let members = state.grouping().members(&group.name, ids);
                    if members.is_empty() {
                        continue;
                    }
                    ui.label(RichText::new(&group.name).color(group.color).strong());
                    for id in members {
                        let len = state.store().get(id).map_or(0, |s| s.len());
                        let is_sel = selected == Some(Selection::Series(id.clone()));
                        if ui
                            .selectable_label(is_sel, format!("  {id}  ({len})"))
                            .on_hover_text("Drive autorange and shift bounds from this series")
                            .clicked()
                        {
                            selected = Some(Selection::Series(id.clone()));
                        }
                    }
                }
            });
        state.select(selected);
    }

    fn render_dataset_list(
        &mut self,
        ui: &mut Ui,
        state: &mut AlignState,
        actions: &mut Vec<UiAction>,
    ) {
        if state.datasets().is_empty() {
            ui.weak("No datasets registered.");
            return;
        }

        let channels = state.datasets().channel_names();
        let mut channel = state.active_channel().unwrap_or_default().to_string();
        egui::ComboBox::from_label("Channel")
            .selected_text(channel.clone())
            .show_ui(ui, |ui| {
                for c in &channels {
                    ui.selectable_value(&mut channel, c.clone(), c.as_str());
                }
            });
        if !channel.is_empty() {
            state.set_active_channel(&channel);
        }

        let ids = state.datasets().ids();
        let mut reference = state.reference_dataset().unwrap_or_default().to_string();
        let ref_name = state
            .datasets()
            .get(&reference)
            .map(|d| d.name.clone())
            .unwrap_or_default();
        egui::ComboBox::from_label("Reference")
            .selected_text(ref_name)
            .show_ui(ui, |ui| {
                for d in state.datasets().iter() {
                    ui.selectable_value(&mut reference, d.id.clone(), d.name.as_str());
                }
            });
        if state.reference_dataset() != Some(reference.as_str()) {
            let result = state.set_reference_dataset(&reference);
            state.report(result);
        }

        ui.separator();
        for id in ids {
            let Some(dataset) = state.datasets().get(&id) else {
                continue;
            };
            let summary = format!(
                "{} rows, {:.2} – {:.2}{}",
                dataset.total_rows,
                dataset.time_range[0],
                dataset.time_range[1],
                dataset
                    .file_size_mb
                    .map(|mb| format!(", {mb:.1} MB"))
                    .unwrap_or_default()
            );
            let name = dataset.name.clone();
            let is_large = dataset.is_large_file;
            ui.horizontal(|ui| {
                match &mut self.editing {
                    Some((editing_id, text)) if *editing_id == id => {
                        let resp = ui.text_edit_singleline(text);
                        let commit = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                        if commit || ui.small_button("✔").clicked() {
                            let name = text.trim().to_string();
                            if !name.is_empty() && name != dataset.name {
                                actions.push(UiAction::Rename {
                                    id: id.clone(),
                                    name,
                                });
                            }
                            self.editing = None;
                        } else if ui.small_button("✖").clicked() {
                            self.editing = None;
                        }
                    }
                    _ => {
                        ui.label(RichText::new(&name).strong());
                        if is_large {
                            ui.label(RichText::new("large").small().italics())
                                .on_hover_text("Displayed from downsampled windows");
                        }
                        if ui.small_button("✏").on_hover_text("Rename").clicked() {
                            self.editing = Some((id.clone(), name.clone()));
                        }
                    }
                }
            });
            ui.label(RichText::new(summary).small().weak());
        }
    }
}

impl Panel for DataPanel {
    fn state(&self) -> &PanelState {
        &self.state
    }
    fn state_mut(&mut self) -> &mut PanelState {
        &mut self.state
    }

    fn render_panel(&mut self, ui: &mut Ui, state: &mut AlignState, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            let mut view = state.view();
            ui.selectable_value(&mut view, ViewMode::Series, "Series");
            ui.selectable_value(&mut view, ViewMode::Datasets, "Datasets");
            state.set_view(view);
        });
        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("⟳ Fetch").clicked() {
                actions.push(match state.view() {
                    ViewMode::Series => UiAction::FetchSeries,
                    ViewMode::Datasets => UiAction::RefreshDatasets,
                });
            }
            if ui.button("Upload…").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("CSV", &["csv"])
                    .pick_file()
                {
                    actions.push(UiAction::Upload {
                        path,
                        multi_channel: self.multi_channel,
                    });
                }
            }
            ui.checkbox(&mut self.multi_channel, "Multi-channel")
                .on_hover_text("Register the file as a dataset with one column per channel");
        });
        if ui
            .button("🗑 Clear all")
            .on_hover_text("Delete every uploaded file on the backend; groups are kept")
            .clicked()
        {
            actions.push(UiAction::ClearAll);
        }
        ui.separator();

        match state.view() {
            ViewMode::Series => self.render_series_list(ui, state),
            ViewMode::Datasets => self.render_dataset_list(ui, state, actions),
        }
    }
}
