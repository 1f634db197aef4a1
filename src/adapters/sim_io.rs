//! In-memory IO board.
//!
//! Stands in for the relay/sensor board when none is attached.  Inputs are
//! set by the caller with [`SimIo::set_input`]; outputs and channel enable
//! lines are held as bitmasks and every change is logged.

use embedded_hal::digital::{ErrorKind, PinState};
use log::{debug, info};

use crate::app::ports::IoDevice;
use crate::error::HardwareError;
use crate::pins::{
    ChannelIndex, INPUT_PIN_COUNT, OUTPUT_PIN_COUNT, PIN_OFF, PinIndex, SOUND_CHANNEL_COUNT,
};

#[derive(Debug, Clone)]
pub struct SimIo {
    inputs: [PinState; INPUT_PIN_COUNT],
    /// Bit `n` set = output `n` ON.
    outputs: u16,
    /// Bit `n` set = channel `n` line enabled.
    channels: u8,
}

impl Default for SimIo {
    fn default() -> Self {
        Self::new()
    }
}

impl SimIo {
    pub fn new() -> Self {
        Self {
            inputs: [PIN_OFF; INPUT_PIN_COUNT],
            outputs: 0,
            channels: 0,
        }
    }

    /// Force an input level.  Out-of-range pins are ignored.
    pub fn set_input(&mut self, pin: PinIndex, level: PinState) {
        if let Some(slot) = self.inputs.get_mut(pin as usize) {
            *slot = level;
        }
    }

    /// Current level of an output pin.
    pub fn output(&self, pin: PinIndex) -> PinState {
        PinState::from((pin as usize) < OUTPUT_PIN_COUNT && self.outputs & (1 << pin) != 0)
    }

    pub fn output_mask(&self) -> u16 {
        self.outputs
    }

    pub fn channel_enabled(&self, channel: ChannelIndex) -> bool {
        (channel as usize) < SOUND_CHANNEL_COUNT && self.channels & (1 << channel) != 0
    }

    fn set_channel(&mut self, channel: ChannelIndex, on: bool) -> Result<(), HardwareError> {
        if channel as usize >= SOUND_CHANNEL_COUNT {
            return Err(HardwareError::Channel {
                channel,
                kind: ErrorKind::Other,
            });
        }
        let before = self.channels;
        if on {
            self.channels |= 1 << channel;
        } else {
            self.channels &= !(1 << channel);
        }
        if before != self.channels {
            debug!("SimIo: channel lines {:#010b}", self.channels);
        }
        Ok(())
    }
}

impl IoDevice for SimIo {
    fn read_input_pin(&mut self, pin: PinIndex) -> Result<PinState, HardwareError> {
        self.inputs
            .get(pin as usize)
            .copied()
            .ok_or(HardwareError::Read {
                pin,
                kind: ErrorKind::Other,
            })
    }

    fn write_output_pin(&mut self, pin: PinIndex, state: PinState) -> Result<(), HardwareError> {
        if pin as usize >= OUTPUT_PIN_COUNT {
            return Err(HardwareError::Write {
                pin,
                kind: ErrorKind::Other,
            });
        }
        match state {
            PinState::High => self.outputs |= 1 << pin,
            PinState::Low => self.outputs &= !(1 << pin),
        }
        info!("SimIo: output pins {:#018b}", self.outputs);
        Ok(())
    }

    fn input_pins(&self) -> Vec<PinIndex> {
        (0..INPUT_PIN_COUNT as PinIndex).collect()
    }

    fn output_pin_count(&self) -> usize {
        OUTPUT_PIN_COUNT
    }

    fn enable_channel(&mut self, channel: ChannelIndex) -> Result<(), HardwareError> {
        self.set_channel(channel, true)
    }

    fn disable_channel(&mut self, channel: ChannelIndex) -> Result<(), HardwareError> {
        self.set_channel(channel, false)
    }

    fn channel_count(&self) -> usize {
        SOUND_CHANNEL_COUNT
    }
}
