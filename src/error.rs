use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the player.
///
/// A short read at the end of the store is not an error: the frame source
/// rewinds and reports an empty tick instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid frame format: {0}")]
    Format(String),

    #[error("shader error: {0}")]
    Shader(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("window error: {0}")]
    Window(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
