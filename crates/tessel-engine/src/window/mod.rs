//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the window, and wires them to the GPU layer.

mod icon;
mod runtime;

pub use icon::WindowIcon;
pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
