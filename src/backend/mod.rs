//! Everything that talks to the correlation backend.

pub mod api;
pub mod client;
pub mod worker;

pub use client::HttpClient;
pub use worker::{Completion, Dispatcher, Job};
