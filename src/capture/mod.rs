pub mod frame;
pub mod planes;
pub mod source;

pub use frame::{ChromaPlane, FrameLayout, LumaPlane, RawFrame};
pub use planes::{split, PlaneExtractor};
pub use source::FrameSource;
