pub mod gpu;
pub mod shader;
pub mod window;

pub use gpu::Nv12Renderer;
pub use shader::ColorMatrix;
pub use window::{run, PlayerApp};
