//! Core types for Easel.

pub mod event;
pub mod message;
pub mod tool;

pub use event::*;
pub use message::*;
pub use tool::*;
