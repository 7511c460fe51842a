//! Utility primitives.

pub mod batch;

pub use batch::run_bounded;
