use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read asset {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image")]
    Decode(#[from] ::image::ImageError),

    /// Requested channel count outside `1..=4`.
    #[error("unsupported channel count {0}")]
    UnsupportedChannels(u8),
}
