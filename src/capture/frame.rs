use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Largest accepted width or height, the wgpu default 2D texture limit
pub const MAX_DIMENSION: u32 = 8192;

/// Largest accepted row stride, bounding one stored frame to 256 MiB
pub const MAX_STRIDE: u32 = 2 * MAX_DIMENSION;

/// Geometry of one stored NV12 frame
///
/// A frame is `height` luma rows followed by `height` chroma rows, every row
/// `stride` bytes long. Only even chroma rows carry data, starting half a
/// stride into the row. A stored frame is therefore `2 * height * stride`
/// bytes rather than the `width * height * 3 / 2` bytes of payload it yields,
/// since the half-stride chroma offsets reach into the full chroma region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameLayout {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
}

impl FrameLayout {
    pub const fn new(width: u32, height: u32, stride: u32) -> Self {
        Self {
            width,
            height,
            stride,
        }
    }

    /// Check the 4:2:0 and stride preconditions the extractor relies on
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Format(format!(
                "frame size {}x{} is empty",
                self.width, self.height
            )));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(Error::Format(format!(
                "frame size {}x{} must be even for 4:2:0 chroma",
                self.width, self.height
            )));
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(Error::Format(format!(
                "frame size {}x{} exceeds {}",
                self.width, self.height, MAX_DIMENSION
            )));
        }
        if self.stride > MAX_STRIDE {
            return Err(Error::Format(format!(
                "stride {} exceeds {}",
                self.stride, MAX_STRIDE
            )));
        }
        if self.stride < self.width {
            return Err(Error::Format(format!(
                "stride {} is smaller than width {}",
                self.stride, self.width
            )));
        }
        Ok(())
    }

    /// Bytes occupied by one stored frame: luma region plus chroma region
    pub fn frame_len(&self) -> usize {
        2 * self.luma_region_len()
    }

    pub fn luma_region_len(&self) -> usize {
        self.height as usize * self.stride as usize
    }

    /// Bytes in the de-strided luma plane
    pub fn luma_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bytes in the de-strided chroma plane, two per chroma sample
    pub fn chroma_len(&self) -> usize {
        self.chroma_width() as usize * self.chroma_height() as usize * 2
    }

    pub fn chroma_width(&self) -> u32 {
        self.width / 2
    }

    pub fn chroma_height(&self) -> u32 {
        self.height / 2
    }
}

/// Reusable buffer holding one stored frame exactly as read from the store
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub data: Vec<u8>,

    /// Frames read since the store was opened, rewinds included
    pub sequence: u64,
}

impl RawFrame {
    pub fn new(layout: &FrameLayout) -> Self {
        Self {
            data: vec![0; layout.frame_len()],
            sequence: 0,
        }
    }
}

/// Full resolution single-channel luma samples, `width` bytes per row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaPlane {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl LumaPlane {
    pub fn new(layout: &FrameLayout) -> Self {
        Self {
            data: vec![0; layout.luma_len()],
            width: layout.width,
            height: layout.height,
        }
    }

    pub fn row(&self, k: usize) -> &[u8] {
        let width = self.width as usize;
        &self.data[k * width..(k + 1) * width]
    }
}

/// Half resolution interleaved (u, v) samples
///
/// Each row holds `width` samples of two bytes, so its byte length equals
/// the luma width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromaPlane {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ChromaPlane {
    pub fn new(layout: &FrameLayout) -> Self {
        Self {
            data: vec![0; layout.chroma_len()],
            width: layout.chroma_width(),
            height: layout.chroma_height(),
        }
    }

    pub fn bytes_per_row(&self) -> usize {
        self.width as usize * 2
    }

    pub fn row(&self, j: usize) -> &[u8] {
        let bpr = self.bytes_per_row();
        &self.data[j * bpr..(j + 1) * bpr]
    }
}
