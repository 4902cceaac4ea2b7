//! Asset loading: files under an `assets/` directory and decoded images.
//!
//! Decoding is delegated to the `image` crate; this module only normalizes the
//! result into tightly packed 8-bit pixels ready for [`crate::upload`].

mod decode;
mod error;
mod fs;

pub use decode::{load_image, ImageData};
pub use error::AssetError;
pub use fs::{asset_path, read_asset};
