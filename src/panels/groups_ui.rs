use egui::{RichText, Ui};

use super::panel_trait::{Panel, PanelState, UiAction};
use crate::state::AlignState;

pub struct GroupsPanel {
    pub state: PanelState,
    new_group: String,
}

impl Default for GroupsPanel {
    fn default() -> Self {
        Self {
            state: PanelState::new("Groups", "🗂"),
            new_group: String::new(),
        }
    }
}

impl Panel for GroupsPanel {
    fn state(&self) -> &PanelState {
        &self.state
    }
    fn state_mut(&mut self) -> &mut PanelState {
        &mut self.state
    }

    fn render_panel(&mut self, ui: &mut Ui, state: &mut AlignState, _actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.new_group);
            if ui.button("➕ Add").clicked() {
                let result = state.add_group(self.new_group.trim());
                if state.report(result).is_some() {
                    self.new_group.clear();
                }
            }
        });
        ui.separator();

        let groups: Vec<(String, egui::Color32)> = state
            .grouping()
            .groups()
            .iter()
            .map(|g| (g.name.clone(), g.color))
            .collect();
        let ids = state.store().ids().to_vec();

        let mut delete = None;
        let mut upload = state.grouping().upload_group().to_string();
        let mut reference = state.grouping().reference_group().to_string();
        egui::Grid::new("groups_grid")
            .num_columns(5)
            .striped(true)
            .show(ui, |ui| {
                ui.label("");
                ui.label(RichText::new("Group").strong());
                ui.label(RichText::new("Upload").strong());
                ui.label(RichText::new("Ref").strong());
                ui.label("");
                ui.end_row();
                for (name, color) in &groups {
                    let members = state.grouping().members(name, &ids).len();
                    ui.label(RichText::new("■").color(*color));
                    ui.label(format!("{name} ({members})"));
                    ui.radio_value(&mut upload, name.clone(), "")
                        .on_hover_text("New uploads are assigned here");
                    ui.radio_value(&mut reference, name.clone(), "")
                        .on_hover_text("Alignment reference");
                    if ui
                        .add_enabled(groups.len() > 1, egui::Button::new("🗑").small())
                        .on_hover_text("Delete group; members move to the first group")
                        .clicked()
                    {
                        delete = Some(name.clone());
                    }
                    ui.end_row();
                }
            });
        if upload != state.grouping().upload_group() {
            let result = state.set_upload_group(&upload);
            state.report(result);
        }
        if reference != state.grouping().reference_group() {
            let result = state.set_reference_group(&reference);
            state.report(result);
        }
        if let Some(name) = delete {
            let result = state.delete_group(&name);
            state.report(result);
        }

        if ids.is_empty() {
            return;
        }
        ui.separator();
        ui.label("Assignments");
        egui::ScrollArea::vertical()
            .id_salt("group_assignments")
            .show(ui, |ui| {
                for id in &ids {
                    let current = state
                        .grouping()
                        .group_of(id)
                        .unwrap_or_default()
                        .to_string();
                    let mut target = current.clone();
                    ui.horizontal(|ui| {
                        ui.label(id.as_str());
                        egui::ComboBox::from_id_salt(("group_of", id.as_str()))
                            .selected_text(target.clone())
                            .show_ui(ui, |ui| {
                                for (name, _) in &groups {
                                    ui.selectable_value(&mut target, name.clone(), name.as_str());
                                }
                            });
                    });
                    if target != current {
                        let result = state.move_series(id, &target);
                        state.report(result);
                    }
                }
            });
    }
}
