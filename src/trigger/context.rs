//! Borrowed view of the controller that trigger handlers work through.
//!
//! `TriggerContext` bundles everything a trigger may touch while it fires
//! or runs a scheduled verb: the current time, the input snapshot, the
//! event queue, the IO device and the sound-channel manager.  The
//! controller builds one per call from disjoint borrows of its own fields.

use core::time::Duration;

use embedded_hal::digital::PinState;

use crate::app::ports::{IoDevice, SoundBackend};
use crate::error::HardwareError;
use crate::events::{Action, Event};
use crate::pins::PinIndex;
use crate::scheduler::EventQueue;
use crate::sound::channels::SoundChannelManager;
use crate::world::WorldState;

pub struct TriggerContext<'a, D: IoDevice, B: SoundBackend> {
    /// Uptime at which the current tick started.
    pub now: Duration,
    pub world: &'a WorldState,
    pub queue: &'a mut EventQueue,
    pub io: &'a mut D,
    pub sounds: &'a mut SoundChannelManager<B>,
}

impl<D: IoDevice, B: SoundBackend> TriggerContext<'_, D, B> {
    /// Enqueue `action` to run `delay` after now.
    pub fn schedule(&mut self, delay: Duration, action: Action) {
        self.queue.push(Event::new(self.now + delay, action));
    }

    /// Drive an output through the world state.
    pub fn drive(&mut self, pin: PinIndex, state: PinState) -> Result<(), HardwareError> {
        self.world.write_pin(&mut *self.io, pin, state)
    }
}
