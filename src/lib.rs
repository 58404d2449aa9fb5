pub mod capture;
pub mod display;
pub mod error;
pub mod pipeline;
pub mod utils;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use capture::frame::{ChromaPlane, FrameLayout, LumaPlane, RawFrame};
pub use error::{Error, Result};

/// Name of the optional configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "yuvloop.toml";

/// Prefix for environment overrides, e.g. `YUVLOOP__SOURCE__PATH=clip.yuv`
pub const ENV_PREFIX: &str = "YUVLOOP";

/// System configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub stride: u32, // Bytes per stored row, luma and chroma alike
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub title: String,
    pub swap_interval: u32, // Vertical blanks per presented frame
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                path: PathBuf::from("nv12.yuv"),
                width: 960,
                height: 540,
                stride: 4096,
            },
            display: DisplayConfig {
                title: "Sample".into(),
                swap_interval: 2,
            },
        }
    }
}

impl Config {
    /// Layer defaults, the optional config file and environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE), None)
    }

    /// Same layering as [`Config::load`] with an explicit file and, when
    /// given, a variable map read in place of the process environment
    pub fn load_from(file: &Path, env: Option<config::Map<String, String>>) -> Result<Self> {
        let defaults = config::Config::try_from(&Config::default())?;

        let config: Config = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        debug!(?config, "configuration loaded");
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would fail inside the render loop
    pub fn validate(&self) -> Result<()> {
        self.source.layout().validate()?;
        if self.display.swap_interval == 0 {
            return Err(Error::Format("swap interval must be at least 1".into()));
        }
        Ok(())
    }
}

impl SourceConfig {
    pub fn layout(&self) -> FrameLayout {
        FrameLayout::new(self.width, self.height, self.stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_constants() {
        let config = Config::default();
        assert_eq!(config.source.width, 960);
        assert_eq!(config.source.height, 540);
        assert_eq!(config.source.stride, 4096);
        assert_eq!(config.display.swap_interval, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_swap_interval_is_rejected() {
        let mut config = Config::default();
        config.display.swap_interval = 0;
        assert!(matches!(config.validate(), Err(Error::Format(_))));
    }

    fn vars(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn load_without_overrides_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join(CONFIG_FILE), vars(&[])).unwrap();
        assert_eq!(config.source.path, PathBuf::from("nv12.yuv"));
        assert_eq!(config.source.width, 960);
        assert_eq!(config.display.title, "Sample");
    }

    #[test]
    fn environment_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let env = vars(&[
            ("YUVLOOP__SOURCE__WIDTH", "1280"),
            ("YUVLOOP__SOURCE__PATH", "clip.yuv"),
        ]);
        let config = Config::load_from(&dir.path().join(CONFIG_FILE), env).unwrap();
        assert_eq!(config.source.path, PathBuf::from("clip.yuv"));
        assert_eq!(config.source.width, 1280);
        assert_eq!(config.source.height, 540);
    }

    #[test]
    fn invalid_environment_override_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(CONFIG_FILE);

        let odd = Config::load_from(&file, vars(&[("YUVLOOP__SOURCE__WIDTH", "1281")]));
        assert!(matches!(odd, Err(Error::Format(_))));

        let huge = Config::load_from(&file, vars(&[("YUVLOOP__SOURCE__STRIDE", "1073741824")]));
        assert!(matches!(huge, Err(Error::Format(_))));
    }

    #[test]
    fn config_file_layers_between_defaults_and_environment() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &file,
            "[source]\npath = \"file.yuv\"\nwidth = 640\nheight = 480\n\n[display]\nswap_interval = 1\n",
        )
        .unwrap();

        let config = Config::load_from(&file, vars(&[("YUVLOOP__SOURCE__HEIGHT", "360")])).unwrap();
        assert_eq!(config.source.path, PathBuf::from("file.yuv"));
        assert_eq!(config.source.width, 640);
        assert_eq!(config.source.height, 360);
        assert_eq!(config.source.stride, 4096);
        assert_eq!(config.display.swap_interval, 1);
        assert_eq!(config.display.title, "Sample");
    }

    #[test]
    fn odd_width_is_rejected() {
        let mut config = Config::default();
        config.source.width = 961;
        assert!(matches!(config.validate(), Err(Error::Format(_))));
    }
}
