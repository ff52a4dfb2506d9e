//! Top-level entry point for running the aligner as a native window.

use eframe::egui;

use crate::config::AlignerConfig;

use super::AlignerApp;

/// Open the aligner window and block until it is closed.
pub fn run_aligner(mut cfg: AlignerConfig) -> eframe::Result<()> {
    let title = cfg.title.clone();
    let mut opts = cfg
        .native_options
        .take()
        .unwrap_or_else(eframe::NativeOptions::default);

    if opts.viewport.inner_size.is_none() {
        opts.viewport = opts
            .viewport
            .clone()
            .with_inner_size(egui::vec2(1400.0, 900.0));
    }

    eframe::run_native(
        &title,
        opts,
        Box::new(move |cc| {
            let app = AlignerApp::new(&cfg, Some(cc.egui_ctx.clone()));
            Ok(Box::new(app))
        }),
    )
}
