use arrayvec::ArrayVec;

use crate::asset::ImageData;

use super::device::{TextureSource, UploadDevice};
use super::UploadError;

/// Maximum number of uploads a single batch can record.
pub const MAX_UPLOAD_ENTRIES: usize = 64;

/// One pending transfer recorded by [`UploadBatch`].
///
/// The source offset is implicit: it is the sum of the sizes of all entries
/// appended before this one.
pub enum UploadEntry<'r, D: UploadDevice> {
    Buffer {
        dst: &'r D::Buffer,
        dst_offset: u64,
        size: u64,
    },
    Texture {
        dst: &'r D::Texture,
        width: u32,
        height: u32,
        /// Staged row pitch; equals `width * channels` unless the device pads rows.
        bytes_per_row: u32,
        size: u64,
    },
}

impl<D: UploadDevice> UploadEntry<'_, D> {
    /// Bytes this entry occupies in the staging region.
    pub fn size(&self) -> u64 {
        match *self {
            Self::Buffer { size, .. } | Self::Texture { size, .. } => size,
        }
    }
}

/// An open batch of CPU → GPU uploads backed by one staging region.
///
/// ```text
/// begin(capacity) ──► append_buffer / append_texture ... ──► finalize()
/// ```
///
/// Appends only write into mapped staging memory and record intent; nothing reaches
/// the GPU queue until [`finalize`](Self::finalize), which records every entry into
/// a single copy pass in append order and submits it.
///
/// `finalize` consumes the batch, so a finalized batch can't be appended to or
/// finalized again. Dropping an open batch unmaps and releases its staging region
/// and discards the pending uploads.
///
/// Destination resources are borrowed for `'r` and must outlive the batch.
pub struct UploadBatch<'d, 'r, D: UploadDevice> {
    device: &'d D,

    /// `None` only once finalize or drop has released it.
    staging: Option<D::Staging>,

    capacity: u64,
    cursor: u64,

    entries: ArrayVec<UploadEntry<'r, D>, MAX_UPLOAD_ENTRIES>,
}

impl<'d, 'r, D: UploadDevice> UploadBatch<'d, 'r, D> {
    /// Opens a batch with a staging region of `capacity` bytes.
    ///
    /// The region never grows; size it for every upload planned for the batch.
    pub fn begin(device: &'d D, capacity: u64) -> Result<Self, UploadError> {
        if capacity == 0 {
            return Err(UploadError::StagingAllocation {
                capacity,
                reason: "zero-sized staging region".to_string(),
            });
        }

        let staging = device.create_staging(capacity)?;
        log::debug!("upload batch opened with {capacity} bytes of staging");

        Ok(Self {
            device,
            staging: Some(staging),
            capacity,
            cursor: 0,
            entries: ArrayVec::new(),
        })
    }

    /// Total staging capacity in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Bytes staged so far.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Bytes still available for appends.
    pub fn remaining(&self) -> u64 {
        self.capacity - self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded entries in append order.
    pub fn entries(&self) -> &[UploadEntry<'r, D>] {
        &self.entries
    }

    /// Stages `data` for a copy into `dst` at `dst_offset`.
    pub fn append_buffer(
        &mut self,
        data: &[u8],
        dst: &'r D::Buffer,
        dst_offset: u64,
    ) -> Result<(), UploadError> {
        let size = data.len() as u64;
        let alignment = self.device.copy_alignment().buffer.max(1);

        if size % alignment != 0 {
            return Err(UploadError::Misaligned {
                what: "buffer upload size",
                value: size,
                alignment,
            });
        }
        if dst_offset % alignment != 0 {
            return Err(UploadError::Misaligned {
                what: "buffer destination offset",
                value: dst_offset,
                alignment,
            });
        }

        let src_offset = self.reserve(size)?;

        let device = self.device;
        device.write_staging(self.staging_mut(), src_offset, data);

        self.entries.push(UploadEntry::Buffer {
            dst,
            dst_offset,
            size,
        });
        self.cursor = src_offset + size;
        Ok(())
    }

    /// Stages `image` for a copy covering all of `dst` from the origin.
    ///
    /// The texture format must match the image layout (e.g. RGBA8 for 4 channels).
    pub fn append_texture(
        &mut self,
        image: &ImageData,
        dst: &'r D::Texture,
    ) -> Result<(), UploadError> {
        let invalid = || UploadError::InvalidImage {
            width: image.width,
            height: image.height,
            channels: image.channels,
            len: image.pixels.len(),
        };

        if image.width == 0 || image.height == 0 || image.channels == 0 {
            return Err(invalid());
        }
        if Some(image.pixels.len()) != image.checked_byte_size() {
            return Err(invalid());
        }

        let row_bytes = image
            .width
            .checked_mul(u32::from(image.channels))
            .ok_or_else(invalid)?;
        let bytes_per_row = self
            .device
            .copy_alignment()
            .row_pitch(row_bytes)
            .ok_or_else(invalid)?;
        let size = u64::from(bytes_per_row) * u64::from(image.height);

        let src_offset = self.reserve(size)?;

        let device = self.device;
        let staging = self.staging_mut();
        if bytes_per_row == row_bytes {
            device.write_staging(staging, src_offset, &image.pixels);
        } else {
            for (y, row) in image.pixels.chunks_exact(row_bytes as usize).enumerate() {
                let offset = src_offset + y as u64 * u64::from(bytes_per_row);
                device.write_staging(staging, offset, row);
            }
        }

        self.entries.push(UploadEntry::Texture {
            dst,
            width: image.width,
            height: image.height,
            bytes_per_row,
            size,
        });
        self.cursor = src_offset + size;
        Ok(())
    }

    /// Unmaps staging, records one copy per entry into a single copy pass, submits
    /// it, and releases the staging region.
    ///
    /// Staging is released whether or not submission succeeds. On failure the
    /// destinations are left with undefined contents.
    pub fn finalize(mut self) -> Result<(), UploadError> {
        let device = self.device;
        let Some(mut staging) = self.staging.take() else {
            return Ok(());
        };

        device.unmap_staging(&mut staging);
        let result = self.record_and_submit(&staging);
        device.release_staging(staging);

        match &result {
            Ok(()) => log::debug!(
                "upload batch submitted: {} entries, {} of {} bytes staged",
                self.entries.len(),
                self.cursor,
                self.capacity
            ),
            Err(e) => log::warn!("upload batch failed: {e}"),
        }

        result
    }

    fn record_and_submit(&self, staging: &D::Staging) -> Result<(), UploadError> {
        let device = self.device;
        let mut pass = device.begin_copy_pass()?;

        let mut src_offset = 0u64;
        for entry in &self.entries {
            match *entry {
                UploadEntry::Buffer {
                    dst,
                    dst_offset,
                    size,
                } => device.copy_to_buffer(&mut pass, staging, src_offset, dst, dst_offset, size),
                UploadEntry::Texture {
                    dst,
                    width,
                    height,
                    bytes_per_row,
                    ..
                } => device.copy_to_texture(
                    &mut pass,
                    staging,
                    TextureSource {
                        offset: src_offset,
                        bytes_per_row,
                        width,
                        height,
                    },
                    dst,
                ),
            }
            src_offset += entry.size();
        }

        device.end_copy_pass(&mut pass);
        device.submit(pass)
    }

    /// Checks that `size` more bytes and one more entry fit; returns the source offset.
    fn reserve(&self, size: u64) -> Result<u64, UploadError> {
        if self.entries.is_full() {
            return Err(UploadError::TooManyEntries {
                max: MAX_UPLOAD_ENTRIES,
            });
        }

        match self.cursor.checked_add(size) {
            Some(end) if end <= self.capacity => Ok(self.cursor),
            _ => Err(UploadError::CapacityExceeded {
                cursor: self.cursor,
                requested: size,
                capacity: self.capacity,
            }),
        }
    }

    fn staging_mut(&mut self) -> &mut D::Staging {
        self.staging
            .as_mut()
            .expect("staging region is held until finalize or drop")
    }
}

impl<D: UploadDevice> Drop for UploadBatch<'_, '_, D> {
    fn drop(&mut self) {
        let Some(mut staging) = self.staging.take() else {
            return;
        };

        log::warn!(
            "upload batch dropped before finalize; discarding {} pending uploads",
            self.entries.len()
        );
        self.device.unmap_staging(&mut staging);
        self.device.release_staging(staging);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::device::CopyAlignment;
    use crate::upload::recording::{FakeBuffer, FakeTexture, Op, RecordingDevice};

    fn rgba(width: u32, height: u32) -> ImageData {
        let pixels = (0..width * height * 4).map(|i| i as u8).collect();
        ImageData::new(pixels, width, height, 4)
    }

    // ── worked scenarios ──────────────────────────────────────────────────

    #[test]
    fn buffer_then_texture_issues_two_copies_at_prefix_offsets() {
        let dev = RecordingDevice::new();
        let vbuf = FakeBuffer::new(1, 48);
        let tex = FakeTexture::new(2, 4, 4, 4);
        let vertices = [7u8; 48];
        let image = rgba(4, 4);

        let mut batch = UploadBatch::begin(&dev, 1024).unwrap();
        batch.append_buffer(&vertices, &vbuf, 0).unwrap();
        batch.append_texture(&image, &tex).unwrap();
        assert_eq!(batch.cursor(), 112);
        batch.finalize().unwrap();

        assert_eq!(
            dev.copies(),
            vec![
                Op::CopyBuffer {
                    src_offset: 0,
                    dst: 1,
                    dst_offset: 0,
                    size: 48,
                },
                Op::CopyTexture {
                    src: TextureSource {
                        offset: 48,
                        bytes_per_row: 16,
                        width: 4,
                        height: 4,
                    },
                    dst: 2,
                },
            ]
        );
    }

    #[test]
    fn oversized_append_is_rejected_without_writing() {
        let dev = RecordingDevice::new();
        let buf = FakeBuffer::new(1, 64);

        let mut batch = UploadBatch::begin(&dev, 32).unwrap();
        let err = batch.append_buffer(&[0u8; 40], &buf, 0).unwrap_err();

        assert!(matches!(
            err,
            UploadError::CapacityExceeded {
                cursor: 0,
                requested: 40,
                capacity: 32,
            }
        ));
        assert!(err.is_contract_violation());
        assert!(batch.is_empty());
        assert_eq!(batch.cursor(), 0);
        assert_eq!(dev.write_count(), 0);
    }

    // ── ordering / offsets ────────────────────────────────────────────────

    #[test]
    fn copies_follow_append_order() {
        let dev = RecordingDevice::new();
        let a = FakeBuffer::new(10, 64);
        let b = FakeBuffer::new(11, 64);
        let c = FakeBuffer::new(12, 64);

        let mut batch = UploadBatch::begin(&dev, 256).unwrap();
        batch.append_buffer(&[1u8; 12], &c, 4).unwrap();
        batch.append_buffer(&[2u8; 20], &a, 0).unwrap();
        batch.append_buffer(&[3u8; 8], &b, 16).unwrap();
        batch.finalize().unwrap();

        assert_eq!(
            dev.copies(),
            vec![
                Op::CopyBuffer {
                    src_offset: 0,
                    dst: 12,
                    dst_offset: 4,
                    size: 12,
                },
                Op::CopyBuffer {
                    src_offset: 12,
                    dst: 10,
                    dst_offset: 0,
                    size: 20,
                },
                Op::CopyBuffer {
                    src_offset: 32,
                    dst: 11,
                    dst_offset: 16,
                    size: 8,
                },
            ]
        );
    }

    #[test]
    fn entries_report_their_staged_sizes() {
        let dev = RecordingDevice::new();
        let buf = FakeBuffer::new(1, 16);
        let tex = FakeTexture::new(2, 2, 3, 4);

        let mut batch = UploadBatch::begin(&dev, 128).unwrap();
        batch.append_buffer(&[0u8; 16], &buf, 0).unwrap();
        batch.append_texture(&rgba(2, 3), &tex).unwrap();

        let sizes: Vec<u64> = batch.entries().iter().map(UploadEntry::size).collect();
        assert_eq!(sizes, vec![16, 24]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.remaining(), 128 - 40);
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn empty_batch_submits_an_empty_pass() {
        let dev = RecordingDevice::new();
        UploadBatch::<RecordingDevice>::begin(&dev, 64)
            .unwrap()
            .finalize()
            .unwrap();

        assert_eq!(
            dev.ops(),
            vec![
                Op::CreateStaging(64),
                Op::Unmap,
                Op::BeginPass,
                Op::EndPass,
                Op::Submit,
                Op::Release,
            ]
        );
    }

    #[test]
    fn finalize_unmaps_before_recording() {
        let dev = RecordingDevice::new();
        let buf = FakeBuffer::new(1, 4);

        let mut batch = UploadBatch::begin(&dev, 64).unwrap();
        batch.append_buffer(&[9u8; 4], &buf, 0).unwrap();
        batch.finalize().unwrap();

        let ops = dev.ops();
        let unmap = ops.iter().position(|op| *op == Op::Unmap).unwrap();
        let begin = ops.iter().position(|op| *op == Op::BeginPass).unwrap();
        assert!(unmap < begin);
        assert_eq!(ops.last(), Some(&Op::Release));
    }

    #[test]
    fn zero_capacity_is_an_allocation_error() {
        let dev = RecordingDevice::new();
        let err = UploadBatch::<RecordingDevice>::begin(&dev, 0).err().unwrap();
        assert!(matches!(err, UploadError::StagingAllocation { capacity: 0, .. }));
        assert!(dev.ops().is_empty());
    }

    #[test]
    fn staging_creation_failure_is_reported() {
        let dev = RecordingDevice {
            fail_create: true,
            ..RecordingDevice::new()
        };
        let err = UploadBatch::<RecordingDevice>::begin(&dev, 64).err().unwrap();
        assert!(matches!(err, UploadError::StagingAllocation { capacity: 64, .. }));
        assert!(!err.is_contract_violation());
    }

    #[test]
    fn submission_failure_still_releases_staging() {
        let dev = RecordingDevice {
            fail_submit: true,
            ..RecordingDevice::new()
        };
        let buf = FakeBuffer::new(1, 8);

        let mut batch = UploadBatch::begin(&dev, 64).unwrap();
        batch.append_buffer(&[1u8; 8], &buf, 0).unwrap();
        let err = batch.finalize().unwrap_err();

        assert!(matches!(err, UploadError::Submission(_)));
        assert_eq!(dev.ops().last(), Some(&Op::Release));
        assert_eq!(dev.release_count(), 1);
    }

    #[test]
    fn pass_acquisition_failure_still_releases_staging() {
        let dev = RecordingDevice {
            fail_begin_pass: true,
            ..RecordingDevice::new()
        };
        let batch = UploadBatch::<RecordingDevice>::begin(&dev, 64).unwrap();
        assert!(matches!(batch.finalize(), Err(UploadError::Submission(_))));
        assert_eq!(dev.ops(), vec![Op::CreateStaging(64), Op::Unmap, Op::Release]);
    }

    #[test]
    fn dropping_an_open_batch_releases_staging_once() {
        let dev = RecordingDevice::new();
        let buf = FakeBuffer::new(1, 8);
        {
            let mut batch = UploadBatch::begin(&dev, 64).unwrap();
            batch.append_buffer(&[1u8; 8], &buf, 0).unwrap();
        }

        assert_eq!(dev.release_count(), 1);
        assert!(!dev.ops().contains(&Op::Submit));
        assert_eq!(buf.contents(), vec![0u8; 8]);
    }

    // ── capacity bounds ───────────────────────────────────────────────────

    #[test]
    fn append_may_fill_capacity_exactly() {
        let dev = RecordingDevice::new();
        let buf = FakeBuffer::new(1, 32);

        let mut batch = UploadBatch::begin(&dev, 32).unwrap();
        batch.append_buffer(&[5u8; 32], &buf, 0).unwrap();
        assert_eq!(batch.remaining(), 0);

        let err = batch.append_buffer(&[5u8; 4], &buf, 0).unwrap_err();
        assert!(matches!(err, UploadError::CapacityExceeded { cursor: 32, .. }));
    }

    #[test]
    fn entry_table_is_bounded() {
        let dev = RecordingDevice::new();
        let buf = FakeBuffer::new(1, 4);

        let mut batch = UploadBatch::begin(&dev, 4096).unwrap();
        for _ in 0..MAX_UPLOAD_ENTRIES {
            batch.append_buffer(&[1u8; 4], &buf, 0).unwrap();
        }
        let writes = dev.write_count();

        let err = batch.append_buffer(&[1u8; 4], &buf, 0).unwrap_err();
        assert!(matches!(err, UploadError::TooManyEntries {
            max: MAX_UPLOAD_ENTRIES,
        }));
        assert_eq!(dev.write_count(), writes);
        assert_eq!(batch.len(), MAX_UPLOAD_ENTRIES);
    }

    #[test]
    fn texture_over_capacity_is_rejected_without_writing() {
        let padded = CopyAlignment {
            buffer: 4,
            texture_row: 256,
        };
        // (alignment, capacity, staged texture size): 4 rows of 3 RGBA pixels.
        let cases = [(CopyAlignment::UNALIGNED, 48, 48), (padded, 1024, 1024)];

        for (alignment, capacity, staged) in cases {
            let dev = RecordingDevice {
                alignment,
                ..RecordingDevice::new()
            };
            let buf = FakeBuffer::new(1, 8);
            let tex = FakeTexture::new(2, 3, 4, 4);

            let mut batch = UploadBatch::begin(&dev, capacity).unwrap();
            batch.append_buffer(&[1u8; 8], &buf, 0).unwrap();
            let writes = dev.write_count();

            let err = batch.append_texture(&rgba(3, 4), &tex).unwrap_err();
            assert!(matches!(
                err,
                UploadError::CapacityExceeded {
                    cursor: 8,
                    requested,
                    ..
                } if requested == staged
            ));
            assert_eq!(batch.cursor(), 8);
            assert_eq!(batch.len(), 1);
            assert_eq!(dev.write_count(), writes);

            batch.finalize().unwrap();
            assert_eq!(tex.contents(), vec![0u8; 3 * 4 * 4]);
        }
    }

    #[test]
    fn entry_table_bound_applies_to_textures() {
        let padded = CopyAlignment {
            buffer: 4,
            texture_row: 256,
        };

        for alignment in [CopyAlignment::UNALIGNED, padded] {
            let dev = RecordingDevice {
                alignment,
                ..RecordingDevice::new()
            };
            let buf = FakeBuffer::new(1, 4);
            let tex = FakeTexture::new(2, 2, 2, 4);

            let mut batch = UploadBatch::begin(&dev, 4096).unwrap();
            for _ in 0..MAX_UPLOAD_ENTRIES {
                batch.append_buffer(&[1u8; 4], &buf, 0).unwrap();
            }
            let (writes, cursor) = (dev.write_count(), batch.cursor());

            let err = batch.append_texture(&rgba(2, 2), &tex).unwrap_err();
            assert!(matches!(
                err,
                UploadError::TooManyEntries {
                    max: MAX_UPLOAD_ENTRIES
                }
            ));
            assert_eq!(batch.len(), MAX_UPLOAD_ENTRIES);
            assert_eq!(batch.cursor(), cursor);
            assert_eq!(dev.write_count(), writes);
        }
    }

    // ── alignment ─────────────────────────────────────────────────────────

    #[test]
    fn misaligned_buffer_upload_is_rejected() {
        let dev = RecordingDevice {
            alignment: CopyAlignment {
                buffer: 4,
                texture_row: 256,
            },
            ..RecordingDevice::new()
        };
        let buf = FakeBuffer::new(1, 16);

        let mut batch = UploadBatch::begin(&dev, 64).unwrap();
        assert!(matches!(
            batch.append_buffer(&[0u8; 6], &buf, 0),
            Err(UploadError::Misaligned {
                what: "buffer upload size",
                value: 6,
                alignment: 4,
            })
        ));
        assert!(matches!(
            batch.append_buffer(&[0u8; 8], &buf, 2),
            Err(UploadError::Misaligned {
                what: "buffer destination offset",
                ..
            })
        ));
        assert_eq!(dev.write_count(), 0);
    }

    #[test]
    fn texture_rows_are_padded_to_device_pitch() {
        let dev = RecordingDevice {
            alignment: CopyAlignment {
                buffer: 4,
                texture_row: 256,
            },
            ..RecordingDevice::new()
        };
        let buf = FakeBuffer::new(1, 8);
        let tex = FakeTexture::new(2, 3, 2, 4);
        let image = rgba(3, 2);

        let mut batch = UploadBatch::begin(&dev, 1024).unwrap();
        batch.append_buffer(&[0u8; 8], &buf, 0).unwrap();
        batch.append_texture(&image, &tex).unwrap();
        assert_eq!(batch.cursor(), 8 + 512);
        batch.finalize().unwrap();

        assert_eq!(
            dev.copies()[1],
            Op::CopyTexture {
                src: TextureSource {
                    offset: 8,
                    bytes_per_row: 256,
                    width: 3,
                    height: 2,
                },
                dst: 2,
            }
        );
        assert_eq!(tex.contents(), image.pixels);
    }

    // ── images ────────────────────────────────────────────────────────────

    #[test]
    fn image_with_mismatched_pixel_data_is_rejected() {
        let dev = RecordingDevice::new();
        let tex = FakeTexture::new(1, 4, 4, 4);
        let short = ImageData::new(vec![0u8; 10], 4, 4, 4);

        let mut batch = UploadBatch::begin(&dev, 1024).unwrap();
        assert!(matches!(
            batch.append_texture(&short, &tex),
            Err(UploadError::InvalidImage {
                width: 4,
                height: 4,
                channels: 4,
                len: 10,
            })
        ));
        assert!(batch.is_empty());
    }

    #[test]
    fn empty_image_is_rejected() {
        let dev = RecordingDevice::new();
        let tex = FakeTexture::new(1, 0, 0, 4);
        let empty = ImageData::new(Vec::new(), 0, 4, 4);

        let mut batch = UploadBatch::begin(&dev, 1024).unwrap();
        assert!(batch.append_texture(&empty, &tex).is_err());
    }

    // ── round trip ────────────────────────────────────────────────────────

    #[test]
    fn destinations_receive_exact_bytes() {
        let dev = RecordingDevice::new();
        let first = FakeBuffer::new(1, 16);
        let second = FakeBuffer::new(2, 16);
        let tex = FakeTexture::new(3, 2, 2, 4);

        let a: Vec<u8> = (0..12).collect();
        let b: Vec<u8> = (100..108).collect();
        let image = rgba(2, 2);

        let mut batch = UploadBatch::begin(&dev, 256).unwrap();
        batch.append_buffer(&a, &first, 4).unwrap();
        batch.append_texture(&image, &tex).unwrap();
        batch.append_buffer(&b, &second, 0).unwrap();
        batch.finalize().unwrap();

        let mut expected_first = vec![0u8; 4];
        expected_first.extend_from_slice(&a);
        assert_eq!(first.contents(), expected_first);

        let mut expected_second = b.clone();
        expected_second.resize(16, 0);
        assert_eq!(second.contents(), expected_second);

        assert_eq!(tex.contents(), image.pixels);
    }
}
