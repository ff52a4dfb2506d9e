pub mod data_ui;
pub mod groups_ui;
pub mod panel_trait;
pub mod plot_ui;
pub mod shift_ui;

pub use data_ui::DataPanel;
pub use groups_ui::GroupsPanel;
pub use panel_trait::{Panel, PanelState, UiAction};
pub use plot_ui::PlotPanel;
pub use shift_ui::ShiftPanel;
