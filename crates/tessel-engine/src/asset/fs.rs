use std::path::{Path, PathBuf};

use super::AssetError;

/// Returns `<root>/assets/<name>`.
pub fn asset_path(root: &Path, name: &str) -> PathBuf {
    root.join("assets").join(name)
}

/// Reads the whole asset file `<root>/assets/<name>`.
pub fn read_asset(root: &Path, name: &str) -> Result<Vec<u8>, AssetError> {
    let path = asset_path(root, name);
    std::fs::read(&path).map_err(|source| AssetError::Io { path, source })
}
