//! Port traits: the hexagonal boundary between the reactive core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (IO board, sound player, clock, event sinks, config
//! storage) implement these traits.  The [`Controller`](super::service::Controller)
//! consumes them via generics, so the core never touches hardware directly.

use core::time::Duration;
use std::path::Path;

use embedded_hal::digital::PinState;

use crate::config::SystemConfig;
use crate::error::{ConfigError, HardwareError, SoundError};
use crate::pins::{ChannelIndex, PinIndex};

// ───────────────────────────────────────────────────────────────
// IO device (driven adapter: hardware ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Digital IO and sound-channel enable lines.
///
/// Failures are fatal to the core: no retry happens above this boundary.
/// An adapter that wants retry or backoff implements it internally.
pub trait IoDevice {
    /// Current level of an input pin.
    fn read_input_pin(&mut self, pin: PinIndex) -> Result<PinState, HardwareError>;

    /// Drive an output pin.
    fn write_output_pin(&mut self, pin: PinIndex, state: PinState) -> Result<(), HardwareError>;

    /// Valid input indices, ascending.  Stable for the process lifetime.
    fn input_pins(&self) -> Vec<PinIndex>;

    /// Number of output pins; valid outputs are `0..output_pin_count()`.
    fn output_pin_count(&self) -> usize;

    /// Energise the hardware line for a virtual sound channel.
    fn enable_channel(&mut self, channel: ChannelIndex) -> Result<(), HardwareError>;

    /// De-energise the hardware line for a virtual sound channel.
    fn disable_channel(&mut self, channel: ChannelIndex) -> Result<(), HardwareError>;

    /// Number of virtual sound channels; valid channels are `0..channel_count()`.
    fn channel_count(&self) -> usize;
}

// ───────────────────────────────────────────────────────────────
// Sound backend (driven adapter: domain → audio output)
// ───────────────────────────────────────────────────────────────

/// Starts, polls and stops playback of individual audio files.
///
/// Playback is fire-and-forget: `play` returns as soon as the file has
/// started and the handle is polled afterwards.
pub trait SoundBackend {
    /// Opaque reference to one playback in progress.
    type Handle;

    fn play(&mut self, file: &Path) -> Result<Self::Handle, SoundError>;

    fn is_playing(&mut self, handle: &mut Self::Handle) -> bool;

    fn stop(&mut self, handle: &mut Self::Handle) -> Result<(), SoundError>;
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic time source.  `now()` is the uptime since the clock's epoch.
pub trait Clock {
    fn now(&self) -> Duration;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The controller emits structured [`ControllerEvent`](super::events::ControllerEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::ControllerEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads the system configuration.
///
/// Implementations MUST run [`SystemConfig::validate`] before returning.
pub trait ConfigPort {
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}
