//! tessel engine crate.
//!
//! Platform + GPU runtime pieces, the staging upload batcher and a small
//! textured-quad renderer built on top of them.

pub mod asset;
pub mod core;
pub mod device;
pub mod logging;
pub mod render;
pub mod time;
pub mod upload;
pub mod window;
