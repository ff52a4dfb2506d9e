use egui::{Color32, RichText, Ui};
use egui_plot::{Legend, Line, Plot, VLine};

use crate::data::viewport::{ReferenceLine, RelayoutEvent};
use crate::state::AlignState;

/// Pixel distance within which a reference line can be grabbed.
const GRAB_RADIUS: f32 = 6.0;

struct TraceDraw {
    label: String,
    color: Color32,
    points: Vec<[f64; 2]>,
    loading: bool,
    error: Option<String>,
}

/// The central plot. Turns pointer interaction into [`RelayoutEvent`]s.
#[derive(Default)]
pub struct PlotPanel {
    /// Reference line under the pointer in the previous frame; panning is
    /// disabled while it is set so the line can be dragged instead.
    hover_line: Option<usize>,
    dragging_line: Option<usize>,
}

impl PlotPanel {
    pub fn show(&mut self, ui: &mut Ui, state: &mut AlignState) {
        let traces: Vec<TraceDraw> = state
            .rendered_traces()
            .into_iter()
            .map(|t| TraceDraw {
                points: t.points(),
                label: t.label,
                color: t.color,
                loading: t.loading,
                error: t.error.map(str::to_string),
            })
            .collect();
        let lines: Vec<ReferenceLine> = state.viewport().reference_lines().lines().to_vec();
        let visible = state.viewport().visible_range();

        self.render_status(ui, &traces);

        let mut events: Vec<RelayoutEvent> = Vec::new();
        let plot = Plot::new("align_plot")
            .legend(Legend::default())
            .allow_double_click_reset(false)
            .allow_drag(self.hover_line.is_none() && self.dragging_line.is_none())
            .allow_scroll(false)
            .allow_boxed_zoom(true);

        let plot_resp = plot.show(ui, |plot_ui| {
            let resp = plot_ui.response().clone();

            let is_zooming_rect = resp.drag_stopped_by(egui::PointerButton::Secondary);
            let is_panning =
                resp.dragged_by(egui::PointerButton::Primary) && resp.is_pointer_button_down_on();
            let scroll = resp.ctx.input(|i| i.raw_scroll_delta);
            let is_zooming_with_wheel = scroll.y != 0.0 && resp.hovered();
            let bounds_changed = is_zooming_rect || is_panning || is_zooming_with_wheel;

            if is_zooming_with_wheel {
                plot_ui.zoom_bounds_around_hovered(egui::Vec2::new(1.0 + scroll.y * 0.001, 1.0));
            }

            if !bounds_changed && self.dragging_line.is_none() {
                match visible {
                    Some((lo, hi)) => plot_ui.set_plot_bounds_x(lo..=hi),
                    None => plot_ui.set_auto_bounds(true),
                }
            }

            for trace in &traces {
                if trace.points.is_empty() {
                    continue;
                }
                plot_ui.line(
                    Line::new(trace.label.as_str(), trace.points.clone()).color(trace.color),
                );
            }
            for line in &lines {
                plot_ui.vline(
                    VLine::new(format!("ref {}", line.id), line.x)
                        .color(line.color)
                        .width(1.5),
                );
            }

            // reference line grab / drag
            let transform = *plot_ui.transform();
            let near = resp.hover_pos().and_then(|p| {
                lines.iter().position(|l| {
                    (transform.position_from_point_x(l.x) - p.x).abs() < GRAB_RADIUS
                })
            });
            if self.dragging_line.is_none() {
                self.hover_line = near;
                if near.is_some() && resp.drag_started_by(egui::PointerButton::Primary) {
                    self.dragging_line = near;
                }
            }
            if let Some(index) = self.dragging_line {
                if let Some(pt) = plot_ui.pointer_coordinate() {
                    events.push(RelayoutEvent::ShapeMoved { index, x: pt.x });
                }
                if resp.drag_stopped() || !resp.is_pointer_button_down_on() {
                    self.dragging_line = None;
                }
            }
        });

        let resp = &plot_resp.response;
        if resp.double_clicked() {
            events.push(RelayoutEvent::AutoRangeReset);
        } else if self.dragging_line.is_none() {
            let committed = resp.drag_stopped_by(egui::PointerButton::Primary)
                || resp.drag_stopped_by(egui::PointerButton::Secondary)
                || (resp.hovered() && ui.input(|i| i.raw_scroll_delta.y != 0.0));
            if committed {
                let bounds = plot_resp.transform.bounds();
                if let Some(event) = RelayoutEvent::range(bounds.min()[0], bounds.max()[0]) {
                    events.push(event);
                }
            }
        }

        for event in events {
            state.apply_relayout(event);
        }
    }

    fn render_status(&self, ui: &mut Ui, traces: &[TraceDraw]) {
        let loading: Vec<&str> = traces
            .iter()
            .filter(|t| t.loading)
            .map(|t| t.label.as_str())
            .collect();
        let failed: Vec<(&str, &str)> = traces
            .iter()
            .filter_map(|t| t.error.as_deref().map(|e| (t.label.as_str(), e)))
            .collect();
        if loading.is_empty() && failed.is_empty() {
            return;
        }
        ui.horizontal_wrapped(|ui| {
            if !loading.is_empty() {
                ui.spinner();
                ui.label(format!("loading {}", loading.join(", ")));
            }
            for (label, error) in failed {
                ui.label(RichText::new(format!("⚠ {label}")).color(Color32::LIGHT_RED))
                    .on_hover_text(error);
            }
        });
    }
}
