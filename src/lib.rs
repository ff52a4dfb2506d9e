//! Series Align crate root: module wiring and re-exports.
//!
//! Compare time series in a shared viewport and align them in time, either
//! automatically through a correlation backend or by hand.
//!
//! - `data`: the synchronous engine (slicing, offsets, viewport, window cache, groups)
//! - `state`: [`AlignState`], the single owner of session state
//! - `backend`: wire types, HTTP client and the background network worker
//! - `panels` / `app`: the egui front end

pub mod app;
pub mod backend;
pub mod config;
pub mod data;
pub mod error;
pub mod panels;
pub mod state;

pub use app::{run_aligner, AlignerApp};
pub use config::AlignerConfig;
pub use error::{AlignError, Result};
pub use state::AlignState;
