//! GPIO board adapter.
//!
//! Turns any set of `embedded_hal` digital pins into an [`IoDevice`].
//! Pin and channel indices are positions in the vectors handed to
//! [`GpioBoard::new`]; each sound channel's enable line is an ordinary
//! output pin.

use embedded_hal::digital::{Error as _, InputPin, OutputPin, PinState};
use log::debug;

use crate::app::ports::IoDevice;
use crate::error::HardwareError;
use crate::pins::{ChannelIndex, PIN_OFF, PIN_ON, PinIndex};

pub struct GpioBoard<I, O> {
    inputs: Vec<I>,
    outputs: Vec<O>,
    channel_lines: Vec<O>,
}

impl<I: InputPin, O: OutputPin> GpioBoard<I, O> {
    pub fn new(inputs: Vec<I>, outputs: Vec<O>, channel_lines: Vec<O>) -> Self {
        debug!(
            "GpioBoard: {} inputs, {} outputs, {} channel lines",
            inputs.len(),
            outputs.len(),
            channel_lines.len()
        );
        Self {
            inputs,
            outputs,
            channel_lines,
        }
    }

    /// Give the pins back, e.g. to reconfigure them.
    pub fn release(self) -> (Vec<I>, Vec<O>, Vec<O>) {
        (self.inputs, self.outputs, self.channel_lines)
    }

    fn set_line(&mut self, channel: ChannelIndex, state: PinState) -> Result<(), HardwareError> {
        let line = self
            .channel_lines
            .get_mut(channel as usize)
            .ok_or(HardwareError::Channel {
                channel,
                kind: embedded_hal::digital::ErrorKind::Other,
            })?;
        line.set_state(state).map_err(|e| HardwareError::Channel {
            channel,
            kind: e.kind(),
        })
    }
}

impl<I: InputPin, O: OutputPin> IoDevice for GpioBoard<I, O> {
    fn read_input_pin(&mut self, pin: PinIndex) -> Result<PinState, HardwareError> {
        let input = self
            .inputs
            .get_mut(pin as usize)
            .ok_or(HardwareError::Read {
                pin,
                kind: embedded_hal::digital::ErrorKind::Other,
            })?;
        input
            .is_high()
            .map(PinState::from)
            .map_err(|e| HardwareError::Read { pin, kind: e.kind() })
    }

    fn write_output_pin(&mut self, pin: PinIndex, state: PinState) -> Result<(), HardwareError> {
        let output = self
            .outputs
            .get_mut(pin as usize)
            .ok_or(HardwareError::Write {
                pin,
                kind: embedded_hal::digital::ErrorKind::Other,
            })?;
        output
            .set_state(state)
            .map_err(|e| HardwareError::Write { pin, kind: e.kind() })
    }

    fn input_pins(&self) -> Vec<PinIndex> {
        (0..self.inputs.len()).map(|p| p as PinIndex).collect()
    }

    fn output_pin_count(&self) -> usize {
        self.outputs.len()
    }

    fn enable_channel(&mut self, channel: ChannelIndex) -> Result<(), HardwareError> {
        self.set_line(channel, PIN_ON)
    }

    fn disable_channel(&mut self, channel: ChannelIndex) -> Result<(), HardwareError> {
        self.set_line(channel, PIN_OFF)
    }

    fn channel_count(&self) -> usize {
        self.channel_lines.len()
    }
}
