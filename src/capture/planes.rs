//! De-striding of raw NV12 frames into contiguous planes

use tracing::instrument;

use super::frame::{ChromaPlane, FrameLayout, LumaPlane};
use crate::{Error, Result};

/// Splits raw frames of a fixed layout into reusable plane buffers
pub struct PlaneExtractor {
    layout: FrameLayout,
}

impl PlaneExtractor {
    pub fn new(layout: FrameLayout) -> Result<Self> {
        layout.validate()?;
        Ok(Self { layout })
    }

    /// Copy the live bytes of `raw` into `luma` and `chroma`, dropping row padding
    #[instrument(level = "trace", skip_all)]
    pub fn split_into(
        &self,
        raw: &[u8],
        luma: &mut LumaPlane,
        chroma: &mut ChromaPlane,
    ) -> Result<()> {
        let layout = &self.layout;
        if raw.len() < layout.frame_len() {
            return Err(Error::Format(format!(
                "raw frame holds {} bytes, layout needs {}",
                raw.len(),
                layout.frame_len()
            )));
        }
        if luma.data.len() != layout.luma_len() || chroma.data.len() != layout.chroma_len() {
            return Err(Error::Format("plane buffers do not match the frame layout".into()));
        }

        let width = layout.width as usize;
        let stride = layout.stride as usize;

        let (luma_region, chroma_region) = raw.split_at(layout.luma_region_len());

        for (k, dst) in luma.data.chunks_exact_mut(width).enumerate() {
            let src = k * stride;
            dst.copy_from_slice(&luma_region[src..src + width]);
        }

        // Chroma lives in the second half of every even row; odd rows are padding.
        let half_stride = stride / 2;
        for (j, dst) in chroma.data.chunks_exact_mut(width).enumerate() {
            let src = 2 * j * stride + half_stride;
            dst.copy_from_slice(&chroma_region[src..src + width]);
        }

        Ok(())
    }

    /// Allocating variant of [`PlaneExtractor::split_into`]
    pub fn split(&self, raw: &[u8]) -> Result<(LumaPlane, ChromaPlane)> {
        let mut luma = LumaPlane::new(&self.layout);
        let mut chroma = ChromaPlane::new(&self.layout);
        self.split_into(raw, &mut luma, &mut chroma)?;
        Ok((luma, chroma))
    }
}

/// Split a raw frame stored with `layout` into fresh luma and chroma planes
pub fn split(raw: &[u8], layout: FrameLayout) -> Result<(LumaPlane, ChromaPlane)> {
    PlaneExtractor::new(layout)?.split(raw)
}
