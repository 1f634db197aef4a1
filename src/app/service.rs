//! Controller, the hexagonal core.
//!
//! [`Controller`] owns the input snapshot, the trigger table, the event
//! queue and the sound-channel manager.  It exposes a hardware-agnostic
//! tick API.  All I/O flows through port traits injected at call sites,
//! making the entire controller testable with mock adapters.
//!
//! ```text
//!   IoDevice ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                │         Controller          │
//!   IoDevice ◀── │ World · Triggers · Queue ·  │
//!                │ SoundChannelManager         │
//!                └────────────────────────────┘
//! ```
//!
//! One tick:
//!
//! 1. `WorldState::scan()`: update the whole snapshot, collect edges
//! 2. `Trigger::fire()` for each rising-edge notification, in order
//! 3. drain every due event, including ones enqueued while draining,
//!    up to `max_events_per_tick`

use core::time::Duration;

use log::{debug, error, info, warn};

use crate::config::SystemConfig;
use crate::error::{ConfigError, HardwareError, Result};
use crate::events::TriggerId;
use crate::pins::{PIN_OFF, PIN_ON};
use crate::scheduler::EventQueue;
use crate::sound::SoundCatalog;
use crate::sound::channels::SoundChannelManager;
use crate::trigger::Trigger;
use crate::trigger::context::TriggerContext;
use crate::world::WorldState;

use super::events::ControllerEvent;
use super::ports::{EventSink, IoDevice, SoundBackend};

/// What one tick did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Input pins whose level changed in this tick's scan.
    pub changed_pins: usize,
    /// Triggers that accepted an activation.
    pub activations: usize,
    /// Scheduled actions executed.
    pub actions_run: usize,
    /// Due actions left queued because the drain cap was reached.
    pub deferred: usize,
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller<B: SoundBackend> {
    world: WorldState,
    queue: EventQueue,
    triggers: Vec<Trigger>,
    sounds: SoundChannelManager<B>,
    max_events_per_tick: usize,
    tick_count: u64,
}

impl<B: SoundBackend> Controller<B> {
    /// Build the controller and validate every trigger against the device
    /// and the sound catalog.
    ///
    /// Fails fast on the first bad pin, channel or sound reference.
    pub fn new(
        config: &SystemConfig,
        catalog: SoundCatalog<B>,
        backend: B,
        io: &impl IoDevice,
    ) -> core::result::Result<Self, ConfigError> {
        config.validate()?;

        let mut world = WorldState::new(io);
        let sounds = SoundChannelManager::new(catalog, backend, io.channel_count())?;
        let mut triggers = Vec::with_capacity(config.triggers.len());

        for (index, tc) in config.triggers.iter().enumerate() {
            let id = TriggerId(index);

            if let Some(pin) = tc.kind.drive_pin() {
                if pin as usize >= io.output_pin_count() {
                    return Err(ConfigError::InvalidOutputPin {
                        trigger: tc.name.clone(),
                        pin,
                    });
                }
            }

            if let Some(binding) = &tc.sound {
                if !sounds.catalog().contains(&binding.name) {
                    return Err(ConfigError::UnknownSound {
                        trigger: tc.name.clone(),
                        sound: binding.name.clone(),
                    });
                }
                if let Some(channel) = binding.channel {
                    if channel as usize >= sounds.channel_count() {
                        return Err(ConfigError::InvalidChannel {
                            trigger: tc.name.clone(),
                            channel,
                        });
                    }
                }
            }

            if !world.subscribe(tc.input_pin, id) {
                return Err(ConfigError::UnknownInputPin {
                    trigger: tc.name.clone(),
                    pin: tc.input_pin,
                });
            }

            let trigger = Trigger::new(id, tc);
            debug!(
                "Trigger {} '{}' ({}) on input {}",
                id,
                trigger.name(),
                trigger.kind().label(),
                trigger.input_pin()
            );
            triggers.push(trigger);
        }

        info!(
            "Controller built: {} triggers, {} sounds, {} channels",
            triggers.len(),
            sounds.catalog().len(),
            sounds.channel_count()
        );

        Ok(Self {
            world,
            queue: EventQueue::new(),
            triggers,
            sounds,
            max_events_per_tick: config.max_events_per_tick,
            tick_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the controller to the sink.  Call once before the first tick.
    pub fn start(&self, sink: &mut impl EventSink) {
        sink.emit(&ControllerEvent::Started {
            triggers: self.triggers.len(),
        });
        info!("Controller started");
    }

    /// Drive every configured output OFF, stop all sounds and disable
    /// every channel line.
    ///
    /// Keeps going after a failed write; the first failure is returned.
    pub fn shutdown(&mut self, io: &mut impl IoDevice) -> core::result::Result<(), HardwareError> {
        let mut first_err = None;

        for trigger in &self.triggers {
            let Some(pin) = trigger.kind().drive_pin() else {
                continue;
            };
            if let Err(e) = self.world.write_pin(io, pin, PIN_OFF) {
                error!("Shutdown: {}", e);
                first_err = first_err.or(Some(e));
            }
        }
        if let Err(e) = self.sounds.stop_all(io) {
            error!("Shutdown: {}", e);
            first_err = first_err.or(Some(e));
        }

        info!("Controller shut down after {} ticks", self.tick_count);
        first_err.map_or(Ok(()), Err)
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one scan-then-drain cycle at uptime `now`.
    ///
    /// Hardware errors abort the tick and propagate; the caller is expected
    /// to [`shutdown`](Self::shutdown) and stop.
    pub fn tick(
        &mut self,
        now: Duration,
        io: &mut impl IoDevice,
        sink: &mut impl EventSink,
    ) -> Result<TickReport> {
        self.tick_count += 1;
        let mut report = TickReport::default();

        // 1. Scan inputs
        let scan = self
            .world
            .scan(io)
            .inspect_err(|e| error!("Input scan failed: {}", e))?;
        report.changed_pins = scan.changed.len();
        for &(pin, level) in &scan.changed {
            sink.emit(&ControllerEvent::InputChanged { pin, level });
        }

        // 2. Rising edges fire their subscribers
        for note in scan.notifications.iter().filter(|n| n.level == PIN_ON) {
            let Some(trigger) = self.triggers.get_mut(note.subscriber.0) else {
                continue;
            };
            let mut ctx = TriggerContext {
                now,
                world: &self.world,
                queue: &mut self.queue,
                io: &mut *io,
                sounds: &mut self.sounds,
            };
            let fired = trigger
                .fire(&mut ctx)
                .inspect_err(|e| error!("Trigger '{}' failed to fire: {}", trigger.name(), e))?;
            if !fired {
                debug!("Trigger '{}' ignored edge on input {}", trigger.name(), note.pin);
                continue;
            }
            report.activations += 1;
            sink.emit(&ControllerEvent::TriggerFired {
                trigger: trigger.id(),
                name: trigger.name().to_string(),
                at: now,
            });
            if !trigger.is_on() {
                sink.emit(&ControllerEvent::TriggerEnded {
                    trigger: trigger.id(),
                    name: trigger.name().to_string(),
                    at: now,
                });
            }
        }

        // 3. Drain due events
        self.drain(now, io, sink, &mut report)?;

        if report != TickReport::default() {
            debug!("Tick {}: {:?}", self.tick_count, report);
        }
        Ok(report)
    }

    fn drain(
        &mut self,
        now: Duration,
        io: &mut impl IoDevice,
        sink: &mut impl EventSink,
        report: &mut TickReport,
    ) -> Result<()> {
        loop {
            if report.actions_run >= self.max_events_per_tick {
                let deferred = self.queue.due_count(now);
                if deferred > 0 {
                    warn!(
                        "Drain limit of {} actions reached, deferring {} to the next tick",
                        self.max_events_per_tick, deferred
                    );
                    report.deferred = deferred;
                    sink.emit(&ControllerEvent::DrainLimitHit {
                        executed: report.actions_run,
                        deferred,
                    });
                }
                return Ok(());
            }

            let Some(event) = self.queue.pop_due(now) else {
                return Ok(());
            };
            let Some(trigger) = self.triggers.get_mut(event.action.trigger.0) else {
                warn!("Dropping action for unknown trigger {}", event.action.trigger);
                continue;
            };

            debug!(
                "Run {:?} for '{}' (due {:?})",
                event.action.verb,
                trigger.name(),
                event.due
            );
            let mut ctx = TriggerContext {
                now,
                world: &self.world,
                queue: &mut self.queue,
                io: &mut *io,
                sounds: &mut self.sounds,
            };
            let ended = trigger
                .run(event.action.verb, &mut ctx)
                .inspect_err(|e| error!("Trigger '{}' action failed: {}", trigger.name(), e))?;
            report.actions_run += 1;

            if ended {
                sink.emit(&ControllerEvent::TriggerEnded {
                    trigger: trigger.id(),
                    name: trigger.name().to_string(),
                    at: now,
                });
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    pub fn trigger(&self, id: TriggerId) -> Option<&Trigger> {
        self.triggers.get(id.0)
    }

    pub fn trigger_by_name(&self, name: &str) -> Option<&Trigger> {
        self.triggers.iter().find(|t| t.name() == name)
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Events still waiting in the queue.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Earliest due time in the queue, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|e| e.due)
    }

    pub fn sounds(&self) -> &SoundChannelManager<B> {
        &self.sounds
    }

    pub fn sounds_mut(&mut self) -> &mut SoundChannelManager<B> {
        &mut self.sounds
    }

    /// Total ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
