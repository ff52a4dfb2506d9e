use std::path::PathBuf;

use egui::Ui;

use crate::data::series::DatasetId;
use crate::state::AlignState;

#[derive(Debug, Clone, Copy)]
pub struct PanelState {
    pub title: &'static str,
    pub icon: &'static str,
    pub visible: bool,
}

impl PanelState {
    pub fn new(title: &'static str, icon: &'static str) -> Self {
        Self {
            title,
            icon,
            visible: true,
        }
    }

    pub fn heading(&self) -> String {
        format!("{} {}", self.icon, self.title)
    }
}

/// Requests a panel hands back to the app; anything needing the network
/// goes through here.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    FetchSeries,
    Upload { path: PathBuf, multi_channel: bool },
    ClearAll,
    Align,
    RefreshDatasets,
    Rename { id: DatasetId, name: String },
}

pub trait Panel {
    fn state(&self) -> &PanelState;
    fn state_mut(&mut self) -> &mut PanelState;

    fn render_menu(&mut self, ui: &mut Ui) {
        let st = self.state_mut();
        let label = st.heading();
        ui.checkbox(&mut st.visible, label);
    }

    fn render_panel(&mut self, ui: &mut Ui, state: &mut AlignState, actions: &mut Vec<UiAction>);
}
