//! Fuzz target: configuration JSON
//!
//! Feeds arbitrary bytes to `SystemConfig::from_json` and, when a config
//! is accepted, builds a `Controller` from it against the simulated board.
//! Verifies:
//! - No panics on any input
//! - Accepted configs pass `validate()` again
//! - Controller construction either succeeds or returns a `ConfigError`
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use propctl::adapters::sim_io::SimIo;
use propctl::app::ports::SoundBackend;
use propctl::app::service::Controller;
use propctl::config::SystemConfig;
use propctl::error::SoundError;
use propctl::sound::{Sound, SoundCatalog};

struct Silent;

impl SoundBackend for Silent {
    type Handle = ();

    fn play(&mut self, _file: &Path) -> Result<(), SoundError> {
        Ok(())
    }

    fn is_playing(&mut self, _handle: &mut ()) -> bool {
        false
    }

    fn stop(&mut self, _handle: &mut ()) -> Result<(), SoundError> {
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = SystemConfig::from_json(text) else {
        return;
    };
    assert!(config.validate().is_ok());

    // Files are never listed from disk here.
    let mut catalog = SoundCatalog::new();
    for sound in &config.sounds {
        catalog.insert(Sound::with_files(sound.name.clone(), Vec::new(), 0));
    }
    let io = SimIo::new();
    let _ = Controller::new(&config, catalog, Silent, &io);
});
