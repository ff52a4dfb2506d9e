pub mod alignment;
pub mod datasets;
pub mod grouping;
pub mod offsets;
pub mod series;
pub mod slicer;
pub mod viewport;
pub mod window_cache;
