//! The eframe application: frame loop, panel layout and network plumbing.

use std::collections::HashSet;

use eframe::egui;
use tracing::info;

use crate::backend::{Completion, Dispatcher, HttpClient, Job};
use crate::config::AlignerConfig;
use crate::data::series::DatasetId;
use crate::error::AlignError;
use crate::panels::{DataPanel, GroupsPanel, Panel, PlotPanel, ShiftPanel, UiAction};
use crate::state::{AlignState, NoticeLevel, ViewMode};

pub struct AlignerApp {
    pub state: AlignState,
    dispatcher: Option<Dispatcher>,
    backend_url: String,
    left_panels: Vec<Box<dyn Panel>>,
    right_panels: Vec<Box<dyn Panel>>,
    plot: PlotPanel,
    /// Datasets whose full channel data has been requested but not received.
    data_requested: HashSet<DatasetId>,
    show_log: bool,
    started: bool,
}

impl AlignerApp {
    /// Build the app. `repaint` is woken by the network worker; pass `None`
    /// when no window is attached.
    pub fn new(cfg: &AlignerConfig, repaint: Option<egui::Context>) -> Self {
        let mut state = AlignState::new(cfg);
        let dispatcher = match HttpClient::new(&cfg.backend_url, cfg.upload_timeout()) {
            Ok(client) => Some(Dispatcher::spawn(client, repaint)),
            Err(e) => {
                state.notifications_mut().error(&e);
                None
            }
        };
        Self {
            state,
            dispatcher,
            backend_url: cfg.backend_url.clone(),
            left_panels: vec![Box::new(DataPanel::default()), Box::new(GroupsPanel::default())],
            right_panels: vec![Box::new(ShiftPanel::default())],
            plot: PlotPanel::default(),
            data_requested: HashSet::new(),
            show_log: false,
            started: false,
        }
    }

    fn submit(&mut self, job: Job) -> bool {
        let sent = self
            .dispatcher
            .as_mut()
            .is_some_and(|d| d.submit(job));
        if !sent {
            self.state
                .notifications_mut()
                .error(&AlignError::Network("backend worker unavailable".to_string()));
        }
        sent
    }

    fn in_flight(&self) -> usize {
        self.dispatcher.as_ref().map_or(0, Dispatcher::in_flight)
    }

    /// Apply everything the worker finished since the last frame.
    fn drain_completions(&mut self) {
        let done = match self.dispatcher.as_mut() {
            Some(d) => d.drain(),
            None => return,
        };
        for completion in done {
            self.apply(completion);
        }
    }

    fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Series(result) => {
                if let Some(map) = self.state.report(result) {
                    self.state.load_series(map);
                }
            }
            Completion::Uploaded(result) => {
                let Some(response) = self.state.report(result) else {
                    return;
                };
                match self.state.register_upload(response) {
                    Ok(Some(_)) => self.state.set_view(ViewMode::Datasets),
                    Ok(None) => {
                        self.submit(Job::FetchSeries);
                    }
                    // already recorded as a notice
                    Err(_) => {}
                }
            }
            Completion::Cleared(result) => {
                if let Some(resp) = self.state.report(result) {
                    self.data_requested.clear();
                    self.state.clear_all(resp.files_deleted_count);
                }
            }
            Completion::Aligned(result) => {
                let _ = self.state.finish_alignment(result);
            }
            Completion::Datasets(result) => {
                if let Some(list) = self.state.report(result) {
                    self.state.replace_datasets(list);
                }
            }
            Completion::DatasetData { id, result } => {
                self.data_requested.remove(&id);
                if let Some(resp) = self.state.report(result) {
                    let loaded = self.state.load_dataset_data(&id, resp.data);
                    self.state.report(loaded);
                }
            }
            Completion::Window { request, result } => {
                self.state.complete_window(&request, result);
            }
            Completion::Renamed {
                id,
                previous,
                result,
            } => self.state.finish_rename(&id, &previous, result),
        }
    }

    /// Issue window fetches and full-data fetches the current view needs.
    fn schedule_fetches(&mut self) {
        for request in self.state.pending_window_requests() {
            if !self.submit(Job::Window(request.clone())) {
                let err = AlignError::Network("backend worker unavailable".to_string());
                self.state.complete_window(&request, Err(err));
            }
        }
        for id in self.state.datasets_needing_data() {
            if self.data_requested.insert(id.clone()) && !self.submit(Job::DatasetData(id.clone())) {
                self.data_requested.remove(&id);
            }
        }
    }

    fn handle_action(&mut self, action: UiAction) {
        match action {
            UiAction::FetchSeries => {
                self.submit(Job::FetchSeries);
            }
            UiAction::RefreshDatasets => {
                self.submit(Job::ListDatasets);
            }
            UiAction::Upload {
                path,
                multi_channel,
            } => {
                self.state
                    .notifications_mut()
                    .info(format!("uploading {}", path.display()));
                self.submit(Job::Upload {
                    path,
                    multi_channel,
                });
            }
            UiAction::ClearAll => {
                self.submit(Job::Clear);
            }
            UiAction::Align => {
                let job = match self.state.view() {
                    ViewMode::Series => {
                        let request = self.state.begin_group_alignment();
                        self.state.report(request).map(Job::AlignGroups)
                    }
                    ViewMode::Datasets => {
                        let request = self.state.begin_dataset_alignment();
                        self.state.report(request).map(Job::AlignDatasets)
                    }
                };
                if let Some(job) = job {
                    if !self.submit(job) {
                        let err = AlignError::Network("backend worker unavailable".to_string());
                        let _ = self.state.finish_alignment(Err(err));
                    }
                }
            }
            UiAction::Rename { id, name } => {
                let renamed = self.state.rename_dataset(&id, &name);
                if let Some(previous) = self.state.report(renamed) {
                    self.submit(Job::Rename { id, name, previous });
                }
            }
        }
    }

    fn render_menu(&mut self, ui: &mut egui::Ui) {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("View", |ui| {
                for panel in self.left_panels.iter_mut().chain(self.right_panels.iter_mut()) {
                    panel.render_menu(ui);
                }
                ui.checkbox(&mut self.show_log, "Notification log");
            });
            ui.separator();
            ui.label(egui::RichText::new(&self.backend_url).small().weak());
            if self.in_flight() > 0 {
                ui.spinner();
            }
        });
    }

    fn render_notifications(&mut self, ui: &mut egui::Ui) {
        let notices = self.state.notifications();
        if self.show_log {
            egui::ScrollArea::vertical()
                .max_height(140.0)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for n in notices.iter() {
                        notice_row(ui, n.level, &n.message, n.at.format("%H:%M:%S").to_string());
                    }
                });
            ui.horizontal(|ui| {
                if ui.small_button("Clear log").clicked() {
                    self.state.notifications_mut().clear();
                }
            });
        } else if let Some(n) = notices.latest() {
            notice_row(ui, n.level, &n.message, n.at.format("%H:%M:%S").to_string());
        }
    }

    fn render_side(ui: &mut egui::Ui, panels: &mut [Box<dyn Panel>], state: &mut AlignState, actions: &mut Vec<UiAction>) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            for panel in panels.iter_mut().filter(|p| p.state().visible) {
                let heading = panel.state().heading();
                egui::CollapsingHeader::new(heading)
                    .default_open(true)
                    .show(ui, |ui| panel.render_panel(ui, state, actions));
            }
        });
    }
}

fn notice_row(ui: &mut egui::Ui, level: NoticeLevel, message: &str, at: String) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(at).small().weak());
        let text = egui::RichText::new(message);
        match level {
            NoticeLevel::Info => ui.label(text),
            NoticeLevel::Error => ui.label(text.color(egui::Color32::LIGHT_RED)),
        };
    });
}

impl eframe::App for AlignerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.started {
            self.started = true;
            info!(backend = %self.backend_url, "loading initial data");
            self.submit(Job::FetchSeries);
            self.submit(Job::ListDatasets);
        }
        self.drain_completions();
        self.schedule_fetches();

        let mut actions: Vec<UiAction> = Vec::new();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| self.render_menu(ui));
        egui::TopBottomPanel::bottom("notifications").show(ctx, |ui| self.render_notifications(ui));

        if self.left_panels.iter().any(|p| p.state().visible) {
            egui::SidePanel::left("left_panels")
                .default_width(300.0)
                .show(ctx, |ui| {
                    Self::render_side(ui, &mut self.left_panels, &mut self.state, &mut actions)
                });
        }
        if self.right_panels.iter().any(|p| p.state().visible) {
            egui::SidePanel::right("right_panels")
                .default_width(320.0)
                .show(ctx, |ui| {
                    Self::render_side(ui, &mut self.right_panels, &mut self.state, &mut actions)
                });
        }
        egui::CentralPanel::default().show(ctx, |ui| self.plot.show(ui, &mut self.state));

        for action in actions {
            self.handle_action(action);
        }
    }
}
