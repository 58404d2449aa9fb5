use std::io::Write;

use tempfile::NamedTempFile;

use yuvloop::capture::{split, FrameSource};
use yuvloop::pipeline::{FrameSink, Player, Tick};
use yuvloop::{ChromaPlane, Error, FrameLayout, LumaPlane, Result};

const LAYOUT: FrameLayout = FrameLayout::new(8, 4, 16);

/// Remembers the first luma and chroma byte of every rendered frame
#[derive(Default)]
struct Recorder {
    frames: Vec<(u8, u8)>,
}

impl FrameSink for Recorder {
    fn render(&mut self, luma: &LumaPlane, chroma: &ChromaPlane) -> Result<()> {
        assert_eq!(luma.data.len(), LAYOUT.luma_len());
        assert_eq!(chroma.data.len(), LAYOUT.chroma_len());
        self.frames.push((luma.data[0], chroma.data[0]));
        Ok(())
    }
}

/// Frame `n` has luma bytes `n` and chroma bytes `0x80 + n`, padding `0xFF`
fn encode_frame(layout: &FrameLayout, n: u8) -> Vec<u8> {
    let width = layout.width as usize;
    let stride = layout.stride as usize;
    let mut raw = vec![0xFF; layout.frame_len()];

    for k in 0..layout.height as usize {
        raw[k * stride..k * stride + width].fill(n);
    }
    let base = layout.luma_region_len();
    for j in 0..layout.chroma_height() as usize {
        let start = base + 2 * j * stride + stride / 2;
        raw[start..start + width].fill(0x80 + n);
    }
    raw
}

fn store_with(frames: &[u8], truncate: usize) -> NamedTempFile {
    let mut bytes: Vec<u8> = frames
        .iter()
        .flat_map(|&n| encode_frame(&LAYOUT, n))
        .collect();
    bytes.truncate(bytes.len() - truncate);

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn three_frame_store_plays_in_order_and_loops() {
    let store = store_with(&[1, 2, 3], 0);
    let source = FrameSource::open(store.path(), LAYOUT).unwrap();
    let mut player = Player::new(source).unwrap();
    let mut sink = Recorder::default();

    let ticks: Vec<Tick> = (0..8).map(|_| player.tick(&mut sink).unwrap()).collect();

    assert_eq!(ticks[3], Tick::Skipped);
    assert_eq!(
        sink.frames,
        vec![
            (1, 0x81),
            (2, 0x82),
            (3, 0x83),
            (1, 0x81),
            (2, 0x82),
            (3, 0x83),
            (1, 0x81)
        ]
    );
    assert_eq!(player.presented(), 7);
    assert_eq!(player.source().rewinds(), 1);
}

#[test]
fn truncated_final_frame_is_never_shown() {
    let store = store_with(&[1, 2], 1);
    let source = FrameSource::open(store.path(), LAYOUT).unwrap();
    let mut player = Player::new(source).unwrap();
    let mut sink = Recorder::default();

    assert_eq!(player.tick(&mut sink).unwrap(), Tick::Presented);
    assert_eq!(player.tick(&mut sink).unwrap(), Tick::Skipped);
    assert_eq!(player.tick(&mut sink).unwrap(), Tick::Presented);

    assert_eq!(sink.frames, vec![(1, 0x81), (1, 0x81)]);
}

#[test]
fn single_frame_store_reproduces_bytes_after_rewind() {
    let store = store_with(&[5], 0);
    let mut source = FrameSource::open(store.path(), LAYOUT).unwrap();

    let first = source.next().unwrap().unwrap().data.clone();
    assert!(source.next().unwrap().is_none());
    let again = source.next().unwrap().unwrap().data.clone();

    assert_eq!(first, encode_frame(&LAYOUT, 5));
    assert_eq!(first, again);
}

#[test]
fn missing_store_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = FrameSource::open(&dir.path().join("absent.yuv"), LAYOUT);
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn default_resolution_round_trip() {
    let layout = FrameLayout::new(960, 540, 4096);
    let width = layout.width as usize;
    let stride = layout.stride as usize;
    let mut raw = vec![0u8; layout.frame_len()];

    // Distinct value per luma row and per chroma sample position
    for k in 0..layout.height as usize {
        for x in 0..width {
            raw[k * stride + x] = (k + x) as u8;
        }
    }
    let base = layout.luma_region_len();
    for j in 0..layout.chroma_height() as usize {
        for x in 0..width {
            raw[base + 2 * j * stride + stride / 2 + x] = (j * 3 + x) as u8;
        }
    }

    let (luma, chroma) = split(&raw, layout).unwrap();

    assert_eq!(luma.data.len(), 960 * 540);
    assert_eq!(chroma.data.len(), 480 * 270 * 2);
    for k in [0, 1, 269, 539] {
        let expected: Vec<u8> = (0..width).map(|x| (k + x) as u8).collect();
        assert_eq!(luma.row(k), expected.as_slice(), "luma row {k}");
    }
    for j in [0, 134, 269] {
        let expected: Vec<u8> = (0..width).map(|x| (j * 3 + x) as u8).collect();
        assert_eq!(chroma.row(j), expected.as_slice(), "chroma row {j}");
    }
}

#[test]
fn malformed_layout_fails_before_reading() {
    let store = store_with(&[1], 0);
    let bad = FrameLayout::new(8, 4, 6);
    assert!(matches!(
        FrameSource::open(store.path(), bad),
        Err(Error::Format(_))
    ));
}
