use super::device::{CopyAlignment, TextureSource, UploadDevice};
use super::UploadError;

/// [`UploadDevice`] implemented on a wgpu device/queue pair.
///
/// Staging resources are `MAP_WRITE | COPY_SRC` buffers mapped at creation.
/// The copy pass is a command encoder; submission errors are captured with
/// device error scopes and reported from [`UploadDevice::submit`].
pub struct WgpuUploadDevice<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
}

impl<'a> WgpuUploadDevice<'a> {
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        Self { device, queue }
    }
}

/// Staging buffer, mapped for writes from creation until `unmap_staging`.
pub struct WgpuStaging {
    buffer: wgpu::Buffer,
}

/// Open copy pass: the encoder plus the error scope guarding it.
pub struct WgpuCopyPass {
    encoder: wgpu::CommandEncoder,
    scope: ErrorScope,
}

impl UploadDevice for WgpuUploadDevice<'_> {
    type Staging = WgpuStaging;
    type Buffer = wgpu::Buffer;
    type Texture = wgpu::Texture;
    type CopyPass = WgpuCopyPass;

    fn copy_alignment(&self) -> CopyAlignment {
        CopyAlignment {
            buffer: wgpu::COPY_BUFFER_ALIGNMENT,
            texture_row: wgpu::COPY_BYTES_PER_ROW_ALIGNMENT,
        }
    }

    fn create_staging(&self, capacity: u64) -> Result<WgpuStaging, UploadError> {
        let size = capacity.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        let max = self.device.limits().max_buffer_size;
        if size > max {
            return Err(UploadError::StagingAllocation {
                capacity,
                reason: format!("device max_buffer_size is {max} bytes"),
            });
        }

        let scope = ErrorScope::start(self.device);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessel upload staging"),
            size,
            usage: wgpu::BufferUsages::MAP_WRITE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: true,
        });
        if let Some(err) = scope.finish() {
            return Err(UploadError::StagingAllocation {
                capacity,
                reason: err.to_string(),
            });
        }

        Ok(WgpuStaging { buffer })
    }

    fn write_staging(&self, staging: &mut WgpuStaging, offset: u64, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let range = MappedWrite::covering(offset, bytes.len() as u64);
        let mut view = staging.buffer.slice(range.start..range.end).get_mapped_range_mut();
        let lead = range.lead as usize;
        view[lead..lead + bytes.len()].copy_from_slice(bytes);
        // The view releases its range on drop, so the next write may overlap it.
    }

    fn unmap_staging(&self, staging: &mut WgpuStaging) {
        staging.buffer.unmap();
    }

    fn release_staging(&self, staging: WgpuStaging) {
        // wgpu keeps the allocation alive until submitted copies that read it complete.
        drop(staging);
    }

    fn begin_copy_pass(&self) -> Result<WgpuCopyPass, UploadError> {
        let scope = ErrorScope::start(self.device);
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tessel upload encoder"),
            });
        Ok(WgpuCopyPass { encoder, scope })
    }

    fn copy_to_buffer(
        &self,
        pass: &mut WgpuCopyPass,
        staging: &WgpuStaging,
        src_offset: u64,
        dst: &wgpu::Buffer,
        dst_offset: u64,
        size: u64,
    ) {
        pass.encoder
            .copy_buffer_to_buffer(&staging.buffer, src_offset, dst, dst_offset, size);
    }

    fn copy_to_texture(
        &self,
        pass: &mut WgpuCopyPass,
        staging: &WgpuStaging,
        src: TextureSource,
        dst: &wgpu::Texture,
    ) {
        pass.encoder.copy_buffer_to_texture(
            wgpu::TexelCopyBufferInfo {
                buffer: &staging.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: src.offset,
                    bytes_per_row: Some(src.bytes_per_row),
                    rows_per_image: Some(src.height),
                },
            },
            wgpu::TexelCopyTextureInfo {
                texture: dst,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: src.width,
                height: src.height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn submit(&self, pass: WgpuCopyPass) -> Result<(), UploadError> {
        let WgpuCopyPass { encoder, scope } = pass;
        self.queue.submit(std::iter::once(encoder.finish()));

        match scope.finish() {
            None => Ok(()),
            Some(err) => {
                log::error!("upload copy pass rejected by the device: {err}");
                Err(UploadError::Submission(err.to_string()))
            }
        }
    }
}

/// Mapped range that satisfies wgpu's rules and covers `offset..offset + len`.
///
/// The start is rounded down to `MAP_ALIGNMENT` and the end up to
/// `COPY_BUFFER_ALIGNMENT`; `lead` is where the write begins inside the range.
/// The end stays in bounds because staging sizes are multiples of
/// `COPY_BUFFER_ALIGNMENT`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct MappedWrite {
    start: u64,
    end: u64,
    lead: u64,
}

impl MappedWrite {
    fn covering(offset: u64, len: u64) -> Self {
        let start = offset - offset % wgpu::MAP_ALIGNMENT;
        let end = (offset + len).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        Self {
            start,
            end,
            lead: offset - start,
        }
    }
}

/// Validation + out-of-memory error scope that pops itself when dropped open.
struct ErrorScope {
    // Declared innermost-first so an unfinished scope pops in LIFO order on drop.
    out_of_memory: wgpu::ErrorScopeGuard,
    validation: wgpu::ErrorScopeGuard,
}

impl ErrorScope {
    fn start(device: &wgpu::Device) -> Self {
        let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let out_of_memory = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        Self {
            out_of_memory,
            validation,
        }
    }

    /// Pops both scopes, blocking until the device reports them.
    fn finish(self) -> Option<wgpu::Error> {
        let out_of_memory = pollster::block_on(self.out_of_memory.pop());
        let validation = pollster::block_on(self.validation.pop());
        out_of_memory.or(validation)
    }
}
