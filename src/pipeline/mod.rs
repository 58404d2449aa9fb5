pub mod pacer;
pub mod player;

pub use pacer::SwapPacer;
pub use player::{FrameSink, Player, Tick};
