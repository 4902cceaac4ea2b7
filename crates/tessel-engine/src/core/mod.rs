//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! the application: the [`App`] callbacks and the contexts handed to them.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{srgb_hex, FrameCtx, InitCtx, WindowCtx};
