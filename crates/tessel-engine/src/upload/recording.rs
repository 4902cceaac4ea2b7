//! Test-only [`UploadDevice`] that records every call and emulates copies on the CPU.

use std::cell::{Cell, RefCell};

use super::device::{CopyAlignment, TextureSource, UploadDevice};
use super::UploadError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Op {
    CreateStaging(u64),
    Write { offset: u64, len: usize },
    Unmap,
    BeginPass,
    CopyBuffer {
        src_offset: u64,
        dst: u32,
        dst_offset: u64,
        size: u64,
    },
    CopyTexture { src: TextureSource, dst: u32 },
    EndPass,
    Submit,
    Release,
}

pub(crate) struct FakeBuffer {
    id: u32,
    contents: RefCell<Vec<u8>>,
}

impl FakeBuffer {
    pub(crate) fn new(id: u32, size: usize) -> Self {
        Self {
            id,
            contents: RefCell::new(vec![0; size]),
        }
    }

    pub(crate) fn contents(&self) -> Vec<u8> {
        self.contents.borrow().clone()
    }
}

pub(crate) struct FakeTexture {
    id: u32,
    width: u32,
    bytes_per_pixel: u32,
    contents: RefCell<Vec<u8>>,
}

impl FakeTexture {
    pub(crate) fn new(id: u32, width: u32, height: u32, bytes_per_pixel: u32) -> Self {
        Self {
            id,
            width,
            bytes_per_pixel,
            contents: RefCell::new(vec![0; (width * height * bytes_per_pixel) as usize]),
        }
    }

    pub(crate) fn contents(&self) -> Vec<u8> {
        self.contents.borrow().clone()
    }
}

pub(crate) struct Staging {
    bytes: Vec<u8>,
    mapped: bool,
}

pub(crate) struct Pass {
    open: bool,
}

pub(crate) struct RecordingDevice {
    pub alignment: CopyAlignment,
    pub fail_create: bool,
    pub fail_begin_pass: bool,
    pub fail_submit: bool,
    pub(crate) ops: RefCell<Vec<Op>>,
    pub(crate) releases: Cell<usize>,
}

impl RecordingDevice {
    pub(crate) fn new() -> Self {
        Self {
            alignment: CopyAlignment::UNALIGNED,
            fail_create: false,
            fail_begin_pass: false,
            fail_submit: false,
            ops: RefCell::new(Vec::new()),
            releases: Cell::new(0),
        }
    }

    pub(crate) fn ops(&self) -> Vec<Op> {
        self.ops.borrow().clone()
    }

    /// Copy commands only, in recording order.
    pub(crate) fn copies(&self) -> Vec<Op> {
        self.ops
            .borrow()
            .iter()
            .filter(|op| matches!(op, Op::CopyBuffer { .. } | Op::CopyTexture { .. }))
            .cloned()
            .collect()
    }

    pub(crate) fn write_count(&self) -> usize {
        self.ops
            .borrow()
            .iter()
            .filter(|op| matches!(op, Op::Write { .. }))
            .count()
    }

    pub(crate) fn release_count(&self) -> usize {
        self.releases.get()
    }

    fn record(&self, op: Op) {
        self.ops.borrow_mut().push(op);
    }
}

impl UploadDevice for RecordingDevice {
    type Staging = Staging;
    type Buffer = FakeBuffer;
    type Texture = FakeTexture;
    type CopyPass = Pass;

    fn copy_alignment(&self) -> CopyAlignment {
        self.alignment
    }

    fn create_staging(&self, capacity: u64) -> Result<Staging, UploadError> {
        if self.fail_create {
            return Err(UploadError::StagingAllocation {
                capacity,
                reason: "injected failure".to_string(),
            });
        }
        self.record(Op::CreateStaging(capacity));
        Ok(Staging {
            bytes: vec![0; capacity as usize],
            mapped: true,
        })
    }

    fn write_staging(&self, staging: &mut Staging, offset: u64, bytes: &[u8]) {
        assert!(staging.mapped, "write to unmapped staging");
        let start = offset as usize;
        let end = start + bytes.len();
        assert!(end <= staging.bytes.len(), "staging write out of bounds");
        staging.bytes[start..end].copy_from_slice(bytes);
        self.record(Op::Write {
            offset,
            len: bytes.len(),
        });
    }

    fn unmap_staging(&self, staging: &mut Staging) {
        assert!(staging.mapped, "staging unmapped twice");
        staging.mapped = false;
        self.record(Op::Unmap);
    }

    fn release_staging(&self, staging: Staging) {
        assert!(!staging.mapped, "staging released while mapped");
        self.releases.set(self.releases.get() + 1);
        self.record(Op::Release);
    }

    fn begin_copy_pass(&self) -> Result<Pass, UploadError> {
        if self.fail_begin_pass {
            return Err(UploadError::Submission("injected failure".to_string()));
        }
        self.record(Op::BeginPass);
        Ok(Pass { open: true })
    }

    fn copy_to_buffer(
        &self,
        pass: &mut Pass,
        staging: &Staging,
        src_offset: u64,
        dst: &FakeBuffer,
        dst_offset: u64,
        size: u64,
    ) {
        assert!(pass.open && !staging.mapped);
        let src = &staging.bytes[src_offset as usize..(src_offset + size) as usize];
        dst.contents.borrow_mut()[dst_offset as usize..(dst_offset + size) as usize]
            .copy_from_slice(src);
        self.record(Op::CopyBuffer {
            src_offset,
            dst: dst.id,
            dst_offset,
            size,
        });
    }

    fn copy_to_texture(
        &self,
        pass: &mut Pass,
        staging: &Staging,
        src: TextureSource,
        dst: &FakeTexture,
    ) {
        assert!(pass.open && !staging.mapped);
        assert_eq!(src.width, dst.width);
        let row = (src.width * dst.bytes_per_pixel) as usize;
        let mut contents = dst.contents.borrow_mut();
        for y in 0..src.height as usize {
            let from = src.offset as usize + y * src.bytes_per_row as usize;
            contents[y * row..(y + 1) * row].copy_from_slice(&staging.bytes[from..from + row]);
        }
        self.record(Op::CopyTexture { src, dst: dst.id });
    }

    fn end_copy_pass(&self, pass: &mut Pass) {
        pass.open = false;
        self.record(Op::EndPass);
    }

    fn submit(&self, pass: Pass) -> Result<(), UploadError> {
        assert!(!pass.open, "submitted an open copy pass");
        if self.fail_submit {
            return Err(UploadError::Submission("injected failure".to_string()));
        }
        self.record(Op::Submit);
        Ok(())
    }
}
