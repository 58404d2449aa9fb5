/// Spreads each frame over a fixed number of presents
///
/// A FIFO surface presents once per vertical blank. Advancing the stream on
/// one redraw out of every `interval` and re-presenting the current image on
/// the others gives the same cadence as a GL swap interval.
#[derive(Debug, Clone)]
pub struct SwapPacer {
    interval: u32,
    redraws: u64,
}

impl SwapPacer {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            redraws: 0,
        }
    }

    /// Whether this redraw should pull a new frame
    pub fn advance(&mut self) -> bool {
        let advance = self.redraws % self.interval as u64 == 0;
        self.redraws += 1;
        advance
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }
}
