//! Looping reader over a flat file of fixed-size raw frames

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use super::frame::{FrameLayout, RawFrame};
use crate::Result;

/// Sequential frame reader that rewinds to the start of the store on a short read
pub struct FrameSource<R> {
    reader: R,
    layout: FrameLayout,
    frame: RawFrame,
    frames_read: u64,
    rewinds: u64,
}

impl FrameSource<BufReader<File>> {
    /// Open the backing file for binary sequential read
    #[instrument(skip(layout))]
    pub fn open(path: &Path, layout: FrameLayout) -> Result<Self> {
        let file = File::open(path)?;
        info!(
            "Opened frame store {} ({}x{}, stride {})",
            path.display(),
            layout.width,
            layout.height,
            layout.stride
        );
        Self::new(BufReader::new(file), layout)
    }
}

impl<R: Read + Seek> FrameSource<R> {
    pub fn new(reader: R, layout: FrameLayout) -> Result<Self> {
        layout.validate()?;

        Ok(Self {
            reader,
            frame: RawFrame::new(&layout),
            layout,
            frames_read: 0,
            rewinds: 0,
        })
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Read the next frame into the shared buffer
    ///
    /// Returns `Ok(None)` after a short read: the store has been rewound and
    /// the caller should skip this tick. Only a failed rewind is an error.
    pub fn next(&mut self) -> Result<Option<&RawFrame>> {
        let wanted = self.frame.data.len();
        let filled = fill(&mut self.reader, &mut self.frame.data);

        if filled < wanted {
            if filled > 0 {
                debug!(filled, wanted, "Truncated frame at end of store");
            }
            self.rewind()?;
            return Ok(None);
        }

        self.frames_read += 1;
        self.frame.sequence = self.frames_read;
        metrics::counter!("frames_read").increment(1);
        Ok(Some(&self.frame))
    }

    /// Seek back to the first frame
    pub fn rewind(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.rewinds += 1;
        metrics::counter!("stream_rewinds").increment(1);
        debug!(rewinds = self.rewinds, "Rewound frame store");
        Ok(())
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    pub fn rewinds(&self) -> u64 {
        self.rewinds
    }
}

/// Read until `buf` is full or the reader stops producing bytes
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> usize {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Frame read failed, treating as end of store: {}", e);
                break;
            }
        }
    }
    filled
}
