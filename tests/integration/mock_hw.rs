//! Mock adapters for integration tests.
//!
//! `MockIo` records every IoDevice call with the simulated time it
//! happened at, so tests can assert on the full hardware history.
//! `MockPlayer` stands in for the sound backend; `RecordingSink` keeps
//! every controller event.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use embedded_hal::digital::{ErrorKind, PinState};
use propctl::app::events::ControllerEvent;
use propctl::app::ports::{EventSink, IoDevice, SoundBackend};
use propctl::error::{HardwareError, SoundError};
use propctl::pins::{ChannelIndex, PIN_OFF, PIN_ON, PinIndex};

// ── IO call record ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoCall {
    Write { pin: PinIndex, state: PinState },
    Enable(ChannelIndex),
    Disable(ChannelIndex),
}

// ── MockIo ────────────────────────────────────────────────────

pub struct MockIo {
    inputs: BTreeMap<PinIndex, PinState>,
    outputs: usize,
    channels: BTreeSet<ChannelIndex>,
    channel_count: usize,
    /// Stamp applied to recorded calls; tests move it along with `tick(now)`.
    pub now: Duration,
    pub calls: Vec<(Duration, IoCall)>,
    /// Next write to this output fails.
    pub fail_write_on: Option<PinIndex>,
    /// Next read of this input fails.
    pub fail_read_on: Option<PinIndex>,
    /// Next enable or disable of this channel line fails.
    pub fail_channel_on: Option<ChannelIndex>,
}

#[allow(dead_code)]
impl MockIo {
    pub fn new() -> Self {
        Self::with_counts(16, 16, 8)
    }

    pub fn with_counts(inputs: usize, outputs: usize, channel_count: usize) -> Self {
        Self {
            inputs: (0..inputs).map(|p| (p as PinIndex, PIN_OFF)).collect(),
            outputs,
            channels: BTreeSet::new(),
            channel_count,
            now: Duration::ZERO,
            calls: Vec::new(),
            fail_write_on: None,
            fail_read_on: None,
            fail_channel_on: None,
        }
    }

    pub fn press(&mut self, pin: PinIndex) {
        self.inputs.insert(pin, PIN_ON);
    }

    pub fn release(&mut self, pin: PinIndex) {
        self.inputs.insert(pin, PIN_OFF);
    }

    pub fn channel_enabled(&self, channel: ChannelIndex) -> bool {
        self.channels.contains(&channel)
    }

    /// Writes to `pin`, with the time they happened at.
    pub fn writes_to(&self, pin: PinIndex) -> Vec<(Duration, PinState)> {
        self.calls
            .iter()
            .filter_map(|(at, call)| match call {
                IoCall::Write { pin: p, state } if *p == pin => Some((*at, *state)),
                _ => None,
            })
            .collect()
    }

    fn check_channel(&mut self, channel: ChannelIndex) -> Result<(), HardwareError> {
        if self.fail_channel_on == Some(channel) {
            self.fail_channel_on = None;
            return Err(HardwareError::Channel {
                channel,
                kind: ErrorKind::Other,
            });
        }
        Ok(())
    }

    /// Last level written to `pin`; OFF if never written.
    pub fn output(&self, pin: PinIndex) -> PinState {
        self.writes_to(pin).last().map_or(PIN_OFF, |(_, s)| *s)
    }
}

impl Default for MockIo {
    fn default() -> Self {
        Self::new()
    }
}

impl IoDevice for MockIo {
    fn read_input_pin(&mut self, pin: PinIndex) -> Result<PinState, HardwareError> {
        if self.fail_read_on == Some(pin) {
            self.fail_read_on = None;
            return Err(HardwareError::Read {
                pin,
                kind: ErrorKind::Other,
            });
        }
        self.inputs.get(&pin).copied().ok_or(HardwareError::Read {
            pin,
            kind: ErrorKind::Other,
        })
    }

    fn write_output_pin(&mut self, pin: PinIndex, state: PinState) -> Result<(), HardwareError> {
        if self.fail_write_on == Some(pin) {
            self.fail_write_on = None;
            return Err(HardwareError::Write {
                pin,
                kind: ErrorKind::Other,
            });
        }
        self.calls.push((self.now, IoCall::Write { pin, state }));
        Ok(())
    }

    fn input_pins(&self) -> Vec<PinIndex> {
        self.inputs.keys().copied().collect()
    }

    fn output_pin_count(&self) -> usize {
        self.outputs
    }

    fn enable_channel(&mut self, channel: ChannelIndex) -> Result<(), HardwareError> {
        self.check_channel(channel)?;
        self.channels.insert(channel);
        self.calls.push((self.now, IoCall::Enable(channel)));
        Ok(())
    }

    fn disable_channel(&mut self, channel: ChannelIndex) -> Result<(), HardwareError> {
        self.check_channel(channel)?;
        self.channels.remove(&channel);
        self.calls.push((self.now, IoCall::Disable(channel)));
        Ok(())
    }

    fn channel_count(&self) -> usize {
        self.channel_count
    }
}

// ── MockPlayer ────────────────────────────────────────────────

#[derive(Default)]
pub struct MockPlayer {
    next: usize,
    /// Every file started, in order.
    pub started: Vec<PathBuf>,
    playing: BTreeMap<usize, PathBuf>,
}

#[allow(dead_code)]
impl MockPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playing_count(&self) -> usize {
        self.playing.len()
    }

    /// Every playback whose file lives under `dir` completes.
    pub fn finish_dir(&mut self, dir: &str) {
        self.playing.retain(|_, file| !file.starts_with(dir));
    }

    pub fn finish_all(&mut self) {
        self.playing.clear();
    }
}

impl SoundBackend for MockPlayer {
    type Handle = usize;

    fn play(&mut self, file: &Path) -> Result<usize, SoundError> {
        let handle = self.next;
        self.next += 1;
        self.started.push(file.to_path_buf());
        self.playing.insert(handle, file.to_path_buf());
        Ok(handle)
    }

    fn is_playing(&mut self, handle: &mut usize) -> bool {
        self.playing.contains_key(handle)
    }

    fn stop(&mut self, handle: &mut usize) -> Result<(), SoundError> {
        self.playing.remove(handle);
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<ControllerEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fired(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ControllerEvent::TriggerFired { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn ended(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ControllerEvent::TriggerEnded { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &ControllerEvent) {
        self.events.push(event.clone());
    }
}
