//! Batched CPU → GPU uploads.
//!
//! An [`UploadBatch`] owns one mapped staging region for its whole lifetime.
//! Buffer and texture uploads are appended into it back to back, and
//! [`UploadBatch::finalize`] moves all of them to their destinations with a single
//! copy pass:
//! - entries are flushed in append order
//! - entry `n` is read from the staging region at the sum of the sizes of entries `0..n`
//! - the staging region is released exactly once, on every path
//!
//! The batcher is written against [`UploadDevice`]; [`WgpuUploadDevice`] is the
//! wgpu implementation used by the engine.

mod backend;
mod batch;
mod device;
mod error;

#[cfg(test)]
mod recording;

pub use backend::{WgpuCopyPass, WgpuStaging, WgpuUploadDevice};
pub use batch::{UploadBatch, UploadEntry, MAX_UPLOAD_ENTRIES};
pub use device::{CopyAlignment, TextureSource, UploadDevice};
pub use error::UploadError;
