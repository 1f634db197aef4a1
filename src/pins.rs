//! Pin and channel assignments for the prop controller board.
//!
//! Single source of truth: the default configuration and the simulated
//! IO device reference this module rather than hard-coding indices.

use embedded_hal::digital::PinState;

/// Index of a digital input or output pin.
pub type PinIndex = u8;

/// Index of a virtual sound channel (one hardware enable line each).
pub type ChannelIndex = u8;

/// Level that counts as "asserted" on both inputs and drive outputs.
pub const PIN_ON: PinState = PinState::High;
/// Released / de-energised level.
pub const PIN_OFF: PinState = PinState::Low;

// ---------------------------------------------------------------------------
// Board capacity
// ---------------------------------------------------------------------------

/// Digital inputs exposed by the sensor board.
pub const INPUT_PIN_COUNT: usize = 16;
/// Relay / driver outputs.
pub const OUTPUT_PIN_COUNT: usize = 16;
/// Virtual sound channels multiplexed onto the amplifier.
pub const SOUND_CHANNEL_COUNT: usize = 8;

/// Upper bound on channels the manager can track (fixed-capacity table).
pub const MAX_SOUND_CHANNELS: usize = 16;

// ---------------------------------------------------------------------------
// Cave scene
// ---------------------------------------------------------------------------

/// Motion sensor at the cave mouth.
pub const BAT_TRIGGER_PIN: PinIndex = 0;
/// Relay driving the bat flapper motor.
pub const BAT_RELAY_PIN: PinIndex = 0;

// ---------------------------------------------------------------------------
// Saloon scene
// ---------------------------------------------------------------------------

/// Shares the cave motion sensor; plays the saloon piano loop.
pub const SALOON_TRIGGER_PIN: PinIndex = 0;
