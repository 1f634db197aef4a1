//! Virtual sound-channel multiplexer.
//!
//! Several virtual channels share one physical playback path; each
//! channel has its own hardware enable line.  The manager remembers which
//! sounds are in flight on each channel and keeps the lines in step:
//!
//! ```text
//!  play_sound(name, ch)
//!     │
//!     ├─ cleanup: drop finished sounds, disable lines that went idle
//!     ├─ ch = None  → play on the default output, no line change
//!     └─ ch = Some  → warn if other channels busy
//!                     enable line, play, record in-flight
//! ```
//!
//! The invariant "line ON iff the channel has sounds in flight" is
//! reconciled lazily at each `play_sound` call, never by a timer.

use std::collections::BTreeSet;

use heapless::Vec as HVec;
use log::{debug, error, warn};

use crate::app::ports::{IoDevice, SoundBackend};
use crate::error::{ConfigError, HardwareError, Result};
use crate::pins::{ChannelIndex, MAX_SOUND_CHANNELS};

use super::{PlayOutcome, SoundCatalog};

/// Channels with sounds in flight.
pub type BusyChannels = HVec<ChannelIndex, MAX_SOUND_CHANNELS>;

#[derive(Debug, Clone, Default)]
struct Channel {
    /// Names of catalog sounds started on this channel and not yet seen finished.
    in_flight: BTreeSet<String>,
}

pub struct SoundChannelManager<B: SoundBackend> {
    catalog: SoundCatalog<B>,
    backend: B,
    channels: HVec<Channel, MAX_SOUND_CHANNELS>,
}

impl<B: SoundBackend> SoundChannelManager<B> {
    pub fn new(
        catalog: SoundCatalog<B>,
        backend: B,
        channel_count: usize,
    ) -> core::result::Result<Self, ConfigError> {
        let mut channels = HVec::new();
        for _ in 0..channel_count {
            channels
                .push(Channel::default())
                .map_err(|_| ConfigError::TooManyChannels(channel_count))?;
        }
        Ok(Self {
            catalog,
            backend,
            channels,
        })
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn catalog(&self) -> &SoundCatalog<B> {
        &self.catalog
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Whether `channel` had sounds in flight at the last cleanup or play.
    pub fn is_busy(&self, channel: ChannelIndex) -> bool {
        self.channels
            .get(channel as usize)
            .is_some_and(|c| !c.in_flight.is_empty())
    }

    /// Sound names recorded on `channel`.
    pub fn in_flight(&self, channel: ChannelIndex) -> Vec<&str> {
        self.channels
            .get(channel as usize)
            .map(|c| c.in_flight.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Drop finished sounds from every channel; disable each line whose
    /// channel went idle as a result.  Returns the channels still busy.
    pub fn cleanup(
        &mut self,
        io: &mut impl IoDevice,
    ) -> core::result::Result<BusyChannels, HardwareError> {
        let Self {
            catalog,
            backend,
            channels,
        } = self;
        let mut busy = BusyChannels::new();

        for (index, channel) in channels.iter_mut().enumerate() {
            if channel.in_flight.is_empty() {
                continue;
            }
            channel.in_flight.retain(|name| {
                catalog
                    .get_mut(name)
                    .is_some_and(|sound| sound.is_playing(backend))
            });
            let index = index as ChannelIndex;
            if channel.in_flight.is_empty() {
                io.disable_channel(index)?;
                debug!("Sound channel {}: disabled, all sounds completed", index);
            } else {
                // Capacity equals the channel table's, so this cannot overflow.
                let _ = busy.push(index);
            }
        }
        Ok(busy)
    }

    /// Play `name` on `channel`, or on the default output when `None`.
    ///
    /// Returns whether the sound is audible afterwards.  Unknown sounds,
    /// unknown channels and backend failures are logged and return
    /// `Ok(false)`; only channel-line failures are errors.
    pub fn play_sound(
        &mut self,
        name: &str,
        channel: Option<ChannelIndex>,
        io: &mut impl IoDevice,
    ) -> Result<bool> {
        let busy = self.cleanup(io)?;

        if !self.catalog.contains(name) {
            warn!("Asked to play unknown sound '{}'", name);
            return Ok(false);
        }

        let Some(ch) = channel else {
            let outcome = self.start(name);
            return Ok(outcome.is_some_and(|o| o.is_audible()));
        };

        if ch as usize >= self.channels.len() {
            warn!("Asked to play '{}' on unknown sound channel {}", name, ch);
            return Ok(false);
        }

        let others: BusyChannels = busy.iter().copied().filter(|&c| c != ch).collect();
        if !others.is_empty() {
            warn!(
                "Playing '{}' on channel {} while sounds are in progress on channels {:?}",
                name, ch, others
            );
        }

        io.enable_channel(ch)?;
        let audible = self.start(name).is_some_and(|o| o.is_audible());
        let slot = &mut self.channels[ch as usize];
        if audible {
            debug!("Sound channel {}: adding '{}'", ch, name);
            slot.in_flight.insert(name.to_string());
        } else if slot.in_flight.is_empty() {
            io.disable_channel(ch)?;
        }
        Ok(audible)
    }

    /// Stop every sound and disable every channel line.
    pub fn stop_all(&mut self, io: &mut impl IoDevice) -> core::result::Result<(), HardwareError> {
        for sound in self.catalog.iter_mut() {
            if let Err(e) = sound.stop_current(&mut self.backend) {
                error!("Sound '{}': {}", sound.name(), e);
            }
        }
        for (index, channel) in self.channels.iter_mut().enumerate() {
            channel.in_flight.clear();
            io.disable_channel(index as ChannelIndex)?;
        }
        Ok(())
    }

    fn start(&mut self, name: &str) -> Option<PlayOutcome> {
        let sound = self.catalog.get_mut(name)?;
        match sound.play_next(&mut self.backend) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Sound '{}': {}", name, e);
                None
            }
        }
    }
}
