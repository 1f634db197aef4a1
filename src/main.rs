//! Prop controller main entry point.
//!
//! Hexagonal architecture with a fixed-period scan-then-drain tick.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimIo / GpioBoard   SoxPlayer      LogEventSink               │
//! │  (IoDevice)          (SoundBackend) (EventSink)                │
//! │  MonotonicClock      JsonConfigFile                            │
//! │  (Clock)             (ConfigPort)                              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (reactive core)                │    │
//! │  │  WorldState · Triggers · EventQueue · Sound channels   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `propctl [config.json]`.  Without an argument the built-in
//! installation is used.  Log level comes from `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use log::{error, info};
use tracing_subscriber::EnvFilter;

use propctl::adapters::config_file::JsonConfigFile;
use propctl::adapters::log_sink::LogEventSink;
use propctl::adapters::sim_io::SimIo;
use propctl::adapters::sox::SoxPlayer;
use propctl::adapters::time::MonotonicClock;
use propctl::app::ports::{Clock, ConfigPort};
use propctl::app::service::Controller;
use propctl::config::SystemConfig;
use propctl::sound::SoundCatalog;

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("propctl v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = match std::env::args_os().nth(1) {
        Some(path) => JsonConfigFile::new(path)
            .load()
            .context("loading configuration")?,
        None => {
            info!("No config path given, using built-in defaults");
            SystemConfig::default()
        }
    };

    // ── 3. Adapters ───────────────────────────────────────────
    let mut io = SimIo::new();
    let catalog = SoundCatalog::from_config(&config.sounds);
    let mut sink = LogEventSink::new();
    let clock = MonotonicClock::new();

    // ── 4. Core ───────────────────────────────────────────────
    let mut controller = Controller::new(&config, catalog, SoxPlayer::new(), &io)
        .context("building controller")?;
    controller.start(&mut sink);

    // ── 5. Tick loop ──────────────────────────────────────────
    let period = config.tick_interval();
    info!("Entering tick loop, period {:?}", period);

    loop {
        let started = clock.now();
        if let Err(e) = controller.tick(started, &mut io, &mut sink) {
            error!("Fatal: {}", e);
            if let Err(shutdown_err) = controller.shutdown(&mut io) {
                error!("Safe shutdown incomplete: {}", shutdown_err);
            }
            return Err(e).context(format!("tick {} failed", controller.tick_count()));
        }

        let elapsed = clock.now().saturating_sub(started);
        std::thread::sleep(period.saturating_sub(elapsed));
    }
}
