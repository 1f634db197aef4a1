//! Unified error types for the prop controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! tick loop's error handling uniform.  Configuration errors are raised
//! only while the controller is being built; hardware errors are fatal and
//! propagate out of the tick; sound errors are logged by the channel
//! manager and never stop the tick.

use core::fmt;

use embedded_hal::digital::ErrorKind;

use crate::pins::{ChannelIndex, PinIndex};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid configuration detected at construction time.
    Config(ConfigError),
    /// The IO device failed a read, write, or channel-line operation.
    Hardware(HardwareError),
    /// The sound backend could not start or stop playback.
    Sound(SoundError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::Hardware(e) => write!(f, "hardware error: {e}"),
            Self::Sound(e) => write!(f, "sound error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Hardware(e) => Some(e),
            Self::Sound(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file does not exist.
    NotFound(String),
    /// Config file could not be read or parsed.
    Malformed(String),
    /// A field failed range validation.  Describes which field and why.
    Invalid(&'static str),
    /// Trigger bound to an input the IO device does not enumerate.
    UnknownInputPin { trigger: String, pin: PinIndex },
    /// Trigger drives an output beyond the device's output count.
    InvalidOutputPin { trigger: String, pin: PinIndex },
    /// Sound binding names a channel beyond the device's channel count.
    InvalidChannel { trigger: String, channel: ChannelIndex },
    /// Sound binding names a sound missing from the catalog.
    UnknownSound { trigger: String, sound: String },
    /// Device reports more channels than the manager can track.
    TooManyChannels(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "config not found: {path}"),
            Self::Malformed(msg) => write!(f, "config malformed: {msg}"),
            Self::Invalid(msg) => write!(f, "validation failed: {msg}"),
            Self::UnknownInputPin { trigger, pin } => {
                write!(f, "trigger '{trigger}' bound to unknown input pin {pin}")
            }
            Self::InvalidOutputPin { trigger, pin } => {
                write!(f, "trigger '{trigger}' drives invalid output pin {pin}")
            }
            Self::InvalidChannel { trigger, channel } => {
                write!(f, "trigger '{trigger}' plays on invalid sound channel {channel}")
            }
            Self::UnknownSound { trigger, sound } => {
                write!(f, "trigger '{trigger}' references unknown sound '{sound}'")
            }
            Self::TooManyChannels(n) => write!(f, "device reports {n} sound channels, too many"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Hardware errors
// ---------------------------------------------------------------------------

/// Failure surfaced by an [`IoDevice`](crate::app::ports::IoDevice).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareError {
    Read { pin: PinIndex, kind: ErrorKind },
    Write { pin: PinIndex, kind: ErrorKind },
    Channel { channel: ChannelIndex, kind: ErrorKind },
}

impl HardwareError {
    /// The underlying embedded-hal error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Read { kind, .. } | Self::Write { kind, .. } | Self::Channel { kind, .. } => {
                *kind
            }
        }
    }
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { pin, kind } => write!(f, "read of input {pin} failed ({kind})"),
            Self::Write { pin, kind } => write!(f, "write of output {pin} failed ({kind})"),
            Self::Channel { channel, kind } => {
                write!(f, "enable line for channel {channel} failed ({kind})")
            }
        }
    }
}

impl std::error::Error for HardwareError {}

impl From<HardwareError> for Error {
    fn from(e: HardwareError) -> Self {
        Self::Hardware(e)
    }
}

// ---------------------------------------------------------------------------
// Sound errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundError {
    /// The player process could not be started for this file.
    StartFailed { file: String, reason: String },
    /// The player process could not be stopped.
    StopFailed(String),
}

impl fmt::Display for SoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartFailed { file, reason } => write!(f, "could not play {file}: {reason}"),
            Self::StopFailed(reason) => write!(f, "could not stop playback: {reason}"),
        }
    }
}

impl std::error::Error for SoundError {}

impl From<SoundError> for Error {
    fn from(e: SoundError) -> Self {
        Self::Sound(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
