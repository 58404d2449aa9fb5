use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::{FrameLayout, Result};

/// What a frame store holds, as far as its length tells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreInfo {
    pub path: PathBuf,
    pub len: u64,
    pub frames: u64,
    pub trailing_bytes: u64,
}

impl StoreInfo {
    pub fn from_len(path: PathBuf, len: u64, layout: &FrameLayout) -> Self {
        let frame_len = layout.frame_len() as u64;
        Self {
            path,
            len,
            frames: len / frame_len,
            trailing_bytes: len % frame_len,
        }
    }
}

/// Inspect the backing file before playback starts
pub fn probe_store(path: &Path, layout: &FrameLayout) -> Result<StoreInfo> {
    let len = std::fs::metadata(path)?.len();
    let store = StoreInfo::from_len(path.to_path_buf(), len, layout);

    info!(
        "Frame store {}: {} bytes, {} frames of {} bytes",
        path.display(),
        store.len,
        store.frames,
        layout.frame_len()
    );

    if store.frames == 0 {
        warn!("Frame store holds no complete frame, nothing will be shown");
    } else if store.trailing_bytes > 0 {
        warn!(
            "Frame store ends with {} bytes of a truncated frame, it will be skipped",
            store.trailing_bytes
        );
    }

    Ok(store)
}
