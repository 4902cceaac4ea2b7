use super::UploadError;

/// Copy alignment rules imposed by a device.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CopyAlignment {
    /// Buffer copy sizes and destination offsets must be multiples of this.
    pub buffer: u64,

    /// Staged texture rows are padded to a multiple of this many bytes.
    pub texture_row: u32,
}

impl CopyAlignment {
    /// No alignment requirements; textures are staged with a tight pitch.
    pub const UNALIGNED: Self = Self {
        buffer: 1,
        texture_row: 1,
    };

    /// Rounds `bytes` up to the texture row alignment, or `None` if that overflows `u32`.
    pub fn row_pitch(&self, bytes: u32) -> Option<u32> {
        bytes.checked_next_multiple_of(self.texture_row.max(1))
    }
}

impl Default for CopyAlignment {
    fn default() -> Self {
        Self::UNALIGNED
    }
}

/// Source description of a staged texture copy.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureSource {
    /// Byte offset of the first row inside the staging resource.
    pub offset: u64,

    /// Distance in bytes between the starts of two consecutive rows.
    pub bytes_per_row: u32,

    pub width: u32,
    pub height: u32,
}

/// GPU-side contract required by [`UploadBatch`](super::UploadBatch).
///
/// The batcher only ever talks to the device through this trait:
/// - one staging resource per batch, created mapped and released exactly once
/// - one copy pass per batch, opened after unmapping and consumed by `submit`
///
/// Destination resources are created and owned by the caller.
pub trait UploadDevice {
    /// Host-visible staging resource.
    type Staging;

    /// Device-local destination buffer.
    type Buffer;

    /// Device-local destination texture.
    type Texture;

    /// Command recording context for one copy pass.
    type CopyPass;

    /// Alignment the batcher must honour when staging.
    fn copy_alignment(&self) -> CopyAlignment {
        CopyAlignment::UNALIGNED
    }

    /// Creates a staging resource of `capacity` bytes, mapped for host writes.
    fn create_staging(&self, capacity: u64) -> Result<Self::Staging, UploadError>;

    /// Writes `bytes` at `offset` into the mapped staging resource.
    ///
    /// The batcher guarantees `offset + bytes.len() <= capacity`.
    fn write_staging(&self, staging: &mut Self::Staging, offset: u64, bytes: &[u8]);

    /// Unmaps the staging resource. No writes follow.
    fn unmap_staging(&self, staging: &mut Self::Staging);

    /// Releases the staging resource.
    fn release_staging(&self, staging: Self::Staging);

    /// Acquires a command context and opens a copy pass on it.
    fn begin_copy_pass(&self) -> Result<Self::CopyPass, UploadError>;

    /// Records a staging → buffer copy.
    fn copy_to_buffer(
        &self,
        pass: &mut Self::CopyPass,
        staging: &Self::Staging,
        src_offset: u64,
        dst: &Self::Buffer,
        dst_offset: u64,
        size: u64,
    );

    /// Records a staging → texture copy covering `src.width × src.height` at the origin.
    fn copy_to_texture(
        &self,
        pass: &mut Self::CopyPass,
        staging: &Self::Staging,
        src: TextureSource,
        dst: &Self::Texture,
    );

    /// Closes the copy pass scope.
    fn end_copy_pass(&self, pass: &mut Self::CopyPass) {
        let _ = pass;
    }

    /// Submits the recorded pass to the device queue.
    fn submit(&self, pass: Self::CopyPass) -> Result<(), UploadError>;
}
