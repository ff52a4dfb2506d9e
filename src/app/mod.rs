//! The egui front end.
//!
//! | Sub-module       | Responsibility |
//! | ---------------- | -------------- |
//! | [`aligner_app`]  | [`AlignerApp`]: frame loop, layout, completion handling |
//! | [`run`]          | [`run_aligner()`] entry point |

mod aligner_app;
mod run;

pub use aligner_app::AlignerApp;
pub use run::run_aligner;
