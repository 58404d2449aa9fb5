//! One-frame-per-tick driver: read, split, render

use std::io::{Read, Seek};
use std::time::Instant;

use tracing::trace;

use crate::capture::{ChromaPlane, FrameSource, LumaPlane, PlaneExtractor};
use crate::Result;

/// Consumer of de-strided planes, typically the GPU color-convert pipeline
pub trait FrameSink {
    /// Replace the displayed image with these planes and draw it
    fn render(&mut self, luma: &LumaPlane, chroma: &ChromaPlane) -> Result<()>;
}

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// A new frame was handed to the sink
    Presented,
    /// The store hit its end and was rewound; nothing was rendered
    Skipped,
}

/// Owns the frame source and the single pair of plane buffers
pub struct Player<R> {
    source: FrameSource<R>,
    extractor: PlaneExtractor,
    luma: LumaPlane,
    chroma: ChromaPlane,
    presented: u64,
}

impl<R: Read + Seek> Player<R> {
    pub fn new(source: FrameSource<R>) -> Result<Self> {
        let layout = *source.layout();
        Ok(Self {
            extractor: PlaneExtractor::new(layout)?,
            luma: LumaPlane::new(&layout),
            chroma: ChromaPlane::new(&layout),
            source,
            presented: 0,
        })
    }

    /// Run one read, split and render step
    pub fn tick<S: FrameSink + ?Sized>(&mut self, sink: &mut S) -> Result<Tick> {
        let Some(frame) = self.source.next()? else {
            return Ok(Tick::Skipped);
        };

        let start = Instant::now();
        self.extractor
            .split_into(&frame.data, &mut self.luma, &mut self.chroma)?;
        metrics::histogram!("split_time_us").record(start.elapsed().as_micros() as f64);

        sink.render(&self.luma, &self.chroma)?;

        self.presented += 1;
        metrics::counter!("frames_presented").increment(1);
        trace!(sequence = frame.sequence, "Presented frame");
        Ok(Tick::Presented)
    }

    pub fn source(&self) -> &FrameSource<R> {
        &self.source
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}
