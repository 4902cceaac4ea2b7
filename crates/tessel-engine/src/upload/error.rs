/// Failures reported by the upload batcher.
///
/// Every variant is detected synchronously by the call that caused it. Nothing is
/// retried; a failed batch has to be rebuilt from `begin` by the caller.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The staging resource could not be created or mapped.
    #[error("failed to allocate a {capacity}-byte staging region: {reason}")]
    StagingAllocation { capacity: u64, reason: String },

    /// The append does not fit in what is left of the staging region.
    #[error(
        "upload of {requested} bytes at cursor {cursor} exceeds the staging capacity of {capacity} bytes"
    )]
    CapacityExceeded {
        cursor: u64,
        requested: u64,
        capacity: u64,
    },

    /// The entry table is full.
    #[error("upload batch already holds the maximum of {max} entries")]
    TooManyEntries { max: usize },

    /// A buffer copy size or offset violates the device copy alignment.
    #[error("{what} {value} is not a multiple of the {alignment}-byte copy alignment")]
    Misaligned {
        what: &'static str,
        value: u64,
        alignment: u64,
    },

    /// Image dimensions and pixel data disagree, or the image is empty.
    #[error("invalid {width}x{height}x{channels} image with {len} bytes of pixel data")]
    InvalidImage {
        width: u32,
        height: u32,
        channels: u8,
        len: usize,
    },

    /// Command recording or submission failed at `finalize`.
    #[error("upload submission failed: {0}")]
    Submission(String),
}

impl UploadError {
    /// Returns `true` for errors caused by sizing a batch incorrectly.
    ///
    /// These are caller contract violations rather than platform failures.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::CapacityExceeded { .. }
                | Self::TooManyEntries { .. }
                | Self::Misaligned { .. }
                | Self::InvalidImage { .. }
        )
    }
}
