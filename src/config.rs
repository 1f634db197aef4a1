//! System configuration parameters
//!
//! Tick timing, the sound catalog directories, and the trigger table.
//! Loaded from JSON at startup; never reloaded while the tick loop runs.

use core::time::Duration;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pins::{self, ChannelIndex, PinIndex};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Timing ---
    /// Main loop period (milliseconds)
    pub tick_interval_ms: u64,
    /// Maximum actions executed per tick before the rest are deferred
    pub max_events_per_tick: usize,

    // --- Sounds ---
    /// Named sounds, each backed by a directory of interchangeable files
    pub sounds: Vec<SoundConfig>,

    // --- Triggers ---
    pub triggers: Vec<TriggerConfig>,
}

/// A named sound and the directory its files live in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundConfig {
    pub name: String,
    pub dir: PathBuf,
}

/// Which sound a trigger plays, and on which virtual channel.
/// `channel: None` plays on the default, always-open output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundBinding {
    pub name: String,
    #[serde(default)]
    pub channel: Option<ChannelIndex>,
}

/// One trigger: an input pin, a cooldown, an optional sound, and a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub name: String,
    pub input_pin: PinIndex,
    pub cooldown_ms: u64,
    pub sound: Option<SoundBinding>,
    #[serde(flatten)]
    pub kind: TriggerKindConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerKindConfig {
    /// Drive a relay ON for `duration_ms`, then OFF.
    TimedRelay { drive_pin: PinIndex, duration_ms: u64 },
    /// Pulse a relay ON for `pulse_duration_ms` every `pulse_interval_ms`
    /// until `duration_ms` has elapsed ("wig-wag").
    Pulse {
        drive_pin: PinIndex,
        duration_ms: u64,
        pulse_interval_ms: u64,
        pulse_duration_ms: u64,
    },
    /// Only plays the bound sound.
    SoundOnly,
}

impl TriggerKindConfig {
    /// Output pin this variant drives, if any.
    pub fn drive_pin(&self) -> Option<PinIndex> {
        match self {
            Self::TimedRelay { drive_pin, .. } | Self::Pulse { drive_pin, .. } => Some(*drive_pin),
            Self::SoundOnly => None,
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        let sounds = ["test", "test_left", "test_right", "tmp1", "tmp2", "saloon"]
            .into_iter()
            .map(|name| SoundConfig {
                name: name.to_string(),
                dir: PathBuf::from("sounds").join(name),
            })
            .collect();

        Self {
            // Timing
            tick_interval_ms: 100, // 10 Hz
            max_events_per_tick: 1024,

            sounds,

            triggers: vec![
                TriggerConfig {
                    name: "bats".into(),
                    input_pin: pins::BAT_TRIGGER_PIN,
                    cooldown_ms: 5_000,
                    sound: None,
                    kind: TriggerKindConfig::TimedRelay {
                        drive_pin: pins::BAT_RELAY_PIN,
                        duration_ms: 20_000,
                    },
                },
                TriggerConfig {
                    name: "saloon_music".into(),
                    input_pin: pins::SALOON_TRIGGER_PIN,
                    cooldown_ms: 20_000,
                    sound: Some(SoundBinding {
                        name: "saloon".into(),
                        channel: None,
                    }),
                    kind: TriggerKindConfig::SoundOnly,
                },
            ],
        }
    }
}

impl SystemConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Range checks that need no hardware.  Pin, channel and sound
    /// references are checked when the controller is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be > 0"));
        }
        if self.max_events_per_tick == 0 {
            return Err(ConfigError::Invalid("max_events_per_tick must be > 0"));
        }
        for trigger in &self.triggers {
            if trigger.name.is_empty() {
                return Err(ConfigError::Invalid("trigger name must not be empty"));
            }
            match trigger.kind {
                TriggerKindConfig::TimedRelay { duration_ms, .. } => {
                    if duration_ms == 0 {
                        return Err(ConfigError::Invalid("timed_relay duration_ms must be > 0"));
                    }
                }
                TriggerKindConfig::Pulse {
                    duration_ms,
                    pulse_interval_ms,
                    pulse_duration_ms,
                    ..
                } => {
                    if duration_ms == 0 || pulse_duration_ms == 0 {
                        return Err(ConfigError::Invalid("pulse durations must be > 0"));
                    }
                    // A zero interval would reschedule forever within one instant.
                    if pulse_interval_ms == 0 {
                        return Err(ConfigError::Invalid("pulse_interval_ms must be > 0"));
                    }
                }
                TriggerKindConfig::SoundOnly => {
                    if trigger.sound.is_none() {
                        return Err(ConfigError::Invalid("sound_only trigger needs a sound"));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
