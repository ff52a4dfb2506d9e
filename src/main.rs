use std::path::PathBuf;

use seriesalign::{run_aligner, AlignerConfig};
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("seriesalign=info")),
        )
        .init();

    let cfg = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => match AlignerConfig::load(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!("{e}; using defaults");
                AlignerConfig::default()
            }
        },
        None => AlignerConfig::default(),
    };

    run_aligner(cfg.with_env_overrides())
}
