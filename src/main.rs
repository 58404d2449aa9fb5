//! yuvloop: loops a raw NV12 file through a GPU color-convert pipeline

use color_eyre::Result;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use yuvloop::capture::FrameSource;
use yuvloop::pipeline::Player;
use yuvloop::{display, utils, Config};

fn main() -> Result<()> {
    // Initialize error handling and logging
    color_eyre::install()?;
    init_tracing();

    info!("yuvloop launching...");

    let config = Config::load()?;
    let layout = config.source.layout();

    // Fatal setup errors surface here, before any window exists
    let source = FrameSource::open(&config.source.path, layout)?;
    utils::probe_store(&config.source.path, &layout)?;
    let player = Player::new(source)?;

    display::run(&config, player)?;

    info!("yuvloop shutting down");
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("yuvloop=info"));

    let registry = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer().with_timer(tracing_subscriber::fmt::time::uptime()),
    );

    #[cfg(feature = "profiling")]
    let registry = registry.with(tracing_tracy::TracyLayer::default());

    registry.init();
}
