//! Authoritative input snapshot and edge-change notification hub.
//!
//! `WorldState` owns the last-observed level of every input pin.  Each
//! [`scan`](WorldState::scan) reads all pins from the IO device, updates
//! the whole snapshot first, and only then reports which subscribers must
//! be notified, so a subscriber that queries the snapshot sees the new
//! level of every pin scanned in the same pass.
//!
//! Subscribers are [`TriggerId`]s.  The subscription table is populated
//! once while triggers are built and never shrinks.

use std::collections::BTreeMap;

use embedded_hal::digital::PinState;
use log::debug;

use crate::app::ports::IoDevice;
use crate::error::HardwareError;
use crate::events::TriggerId;
use crate::pins::{PIN_OFF, PinIndex};

/// One subscriber to notify about one changed pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub pin: PinIndex,
    pub level: PinState,
    pub subscriber: TriggerId,
}

/// Result of a single scan.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Pins whose level differed from the snapshot, ascending.
    pub changed: Vec<(PinIndex, PinState)>,
    /// Subscribers to invoke: pin order, then registration order.
    pub notifications: Vec<Notification>,
}

pub struct WorldState {
    /// Last observed level per input pin.  Starts all-low.
    snapshot: BTreeMap<PinIndex, PinState>,
    subscribers: BTreeMap<PinIndex, Vec<TriggerId>>,
}

impl WorldState {
    /// Build the snapshot from the device's input enumeration.
    pub fn new(io: &impl IoDevice) -> Self {
        let pins = io.input_pins();
        Self {
            snapshot: pins.iter().map(|&p| (p, PIN_OFF)).collect(),
            subscribers: pins.iter().map(|&p| (p, Vec::new())).collect(),
        }
    }

    /// Whether `pin` is one of the device's inputs.
    pub fn has_input(&self, pin: PinIndex) -> bool {
        self.snapshot.contains_key(&pin)
    }

    /// Last observed level of `pin`.  Unknown pins read as OFF.
    pub fn pin_state(&self, pin: PinIndex) -> PinState {
        self.snapshot.get(&pin).copied().unwrap_or(PIN_OFF)
    }

    /// Register `subscriber` for changes on `pin`.
    ///
    /// Returns `false` (and registers nothing) if `pin` is not an input.
    pub fn subscribe(&mut self, pin: PinIndex, subscriber: TriggerId) -> bool {
        match self.subscribers.get_mut(&pin) {
            Some(list) => {
                list.push(subscriber);
                true
            }
            None => false,
        }
    }

    /// Subscribers registered on `pin`, in registration order.
    pub fn subscribers(&self, pin: PinIndex) -> &[TriggerId] {
        self.subscribers.get(&pin).map_or(&[], Vec::as_slice)
    }

    /// Read every input and report the edges since the previous scan.
    ///
    /// A read failure aborts the scan before anything is committed, so the
    /// snapshot is untouched and the next scan sees the same edges.
    pub fn scan(&mut self, io: &mut impl IoDevice) -> Result<ScanReport, HardwareError> {
        let readings = self
            .snapshot
            .keys()
            .map(|&pin| io.read_input_pin(pin).map(|level| (pin, level)))
            .collect::<Result<Vec<(PinIndex, PinState)>, _>>()?;

        let mut report = ScanReport::default();
        for (pin, new_level) in readings {
            let Some(level) = self.snapshot.get_mut(&pin) else {
                continue;
            };
            if *level != new_level {
                debug!("WorldState: input {} changed {:?} -> {:?}", pin, level, new_level);
                *level = new_level;
                report.changed.push((pin, new_level));
            }
        }

        for &(pin, level) in &report.changed {
            for &subscriber in self.subscribers(pin) {
                report.notifications.push(Notification {
                    pin,
                    level,
                    subscriber,
                });
            }
        }

        Ok(report)
    }

    /// Forward an output write straight to the device.
    pub fn write_pin(
        &self,
        io: &mut impl IoDevice,
        pin: PinIndex,
        state: PinState,
    ) -> Result<(), HardwareError> {
        io.write_output_pin(pin, state)
    }
}
