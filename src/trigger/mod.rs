//! Trigger state machines.
//!
//! A trigger is bound to one input pin.  When that pin rises it runs a
//! cooldown-gated activation that schedules hardware actions through the
//! event queue and optionally plays a sound.
//!
//! ```text
//!            fire() [pin ON, !on, now >= cooldown_until]
//!   IDLE ───────────────────────────────────────────────▶ ACTIVE
//!    ▲                                                    │
//!    │                        end() ─ on = false          │
//!    └──────── COOLDOWN ◀─────────────────────────────────┘
//!              (until cooldown_until; orthogonal to `on`)
//! ```
//!
//! Variants form a closed set ([`TriggerKind`]); all share the guard and
//! cooldown logic here and differ only in the start/end behaviours in
//! [`behaviors`].

pub mod behaviors;
pub mod context;

use core::time::Duration;

use log::{debug, info};

use crate::app::ports::{IoDevice, SoundBackend};
use crate::config::{SoundBinding, TriggerConfig, TriggerKindConfig};
use crate::error::Result;
use crate::events::{TriggerId, Verb};
use crate::pins::{PIN_OFF, PIN_ON, PinIndex};
use behaviors::Completion;
use context::TriggerContext;

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// One ON, then one OFF `duration` later.
    TimedRelay { drive_pin: PinIndex, duration: Duration },
    /// "Wig-wag": ON for `pulse_duration` every `pulse_interval` until
    /// `end_at`.  Overlap when `pulse_duration >= pulse_interval` is the
    /// caller's responsibility.
    Pulse {
        drive_pin: PinIndex,
        duration: Duration,
        pulse_interval: Duration,
        pulse_duration: Duration,
        /// Set at each activation.
        end_at: Duration,
    },
    /// Drives nothing; ends as soon as it has fired.
    SoundOnly,
}

impl TriggerKind {
    pub fn from_config(config: &TriggerKindConfig) -> Self {
        match *config {
            TriggerKindConfig::TimedRelay {
                drive_pin,
                duration_ms,
            } => Self::TimedRelay {
                drive_pin,
                duration: Duration::from_millis(duration_ms),
            },
            TriggerKindConfig::Pulse {
                drive_pin,
                duration_ms,
                pulse_interval_ms,
                pulse_duration_ms,
            } => Self::Pulse {
                drive_pin,
                duration: Duration::from_millis(duration_ms),
                pulse_interval: Duration::from_millis(pulse_interval_ms),
                pulse_duration: Duration::from_millis(pulse_duration_ms),
                end_at: Duration::ZERO,
            },
            TriggerKindConfig::SoundOnly => Self::SoundOnly,
        }
    }

    pub fn drive_pin(&self) -> Option<PinIndex> {
        match self {
            Self::TimedRelay { drive_pin, .. } | Self::Pulse { drive_pin, .. } => Some(*drive_pin),
            Self::SoundOnly => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TimedRelay { .. } => "timed-relay",
            Self::Pulse { .. } => "pulse",
            Self::SoundOnly => "sound-only",
        }
    }
}

/// Observable lifecycle state.  `Active` wins over `Cooldown` while `on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    Active,
    Cooldown,
}

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Trigger {
    id: TriggerId,
    name: String,
    input_pin: PinIndex,
    cooldown: Duration,
    cooldown_until: Duration,
    on: bool,
    sound: Option<SoundBinding>,
    kind: TriggerKind,
    activations: u64,
}

impl Trigger {
    pub fn new(id: TriggerId, config: &TriggerConfig) -> Self {
        Self {
            id,
            name: config.name.clone(),
            input_pin: config.input_pin,
            cooldown: Duration::from_millis(config.cooldown_ms),
            cooldown_until: Duration::ZERO,
            on: false,
            sound: config.sound.clone(),
            kind: TriggerKind::from_config(&config.kind),
            activations: 0,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn id(&self) -> TriggerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_pin(&self) -> PinIndex {
        self.input_pin
    }

    pub fn kind(&self) -> &TriggerKind {
        &self.kind
    }

    pub fn sound(&self) -> Option<&SoundBinding> {
        self.sound.as_ref()
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn cooldown_until(&self) -> Duration {
        self.cooldown_until
    }

    /// Completed `fire()` calls since startup.
    pub fn activations(&self) -> u64 {
        self.activations
    }

    pub fn state(&self, now: Duration) -> TriggerState {
        if self.on {
            TriggerState::Active
        } else if now < self.cooldown_until {
            TriggerState::Cooldown
        } else {
            TriggerState::Idle
        }
    }

    // ── Transitions ───────────────────────────────────────────

    /// Attempt an activation.  Returns whether it happened.
    ///
    /// Silently refused unless the bound pin reads ON in the snapshot, the
    /// trigger is not already on, and the cooldown has elapsed.
    pub fn fire<D: IoDevice, B: SoundBackend>(
        &mut self,
        ctx: &mut TriggerContext<'_, D, B>,
    ) -> Result<bool> {
        if ctx.world.pin_state(self.input_pin) != PIN_ON
            || self.on
            || ctx.now < self.cooldown_until
        {
            return Ok(false);
        }

        self.on = true;
        self.activations += 1;
        info!("Trigger '{}' ({}) fired", self.name, self.kind.label());

        let completion = behaviors::start(self, ctx);
        self.cooldown_until = ctx.now + self.cooldown;

        if let Some(binding) = &self.sound {
            ctx.sounds
                .play_sound(&binding.name, binding.channel, &mut *ctx.io)?;
        }

        if completion == Completion::Immediate {
            self.end(ctx)?;
        }
        Ok(true)
    }

    /// Return to `on = false` and run the variant's end behaviour.
    /// Independent of the cooldown.
    pub fn end<D: IoDevice, B: SoundBackend>(
        &mut self,
        ctx: &mut TriggerContext<'_, D, B>,
    ) -> Result<()> {
        self.on = false;
        behaviors::end(self, ctx)?;
        info!("Trigger '{}' ended", self.name);
        Ok(())
    }

    /// Run a scheduled verb.  Returns whether the trigger ended.
    ///
    /// Verbs that would extend an activation are dropped once the trigger
    /// is off; OFF writes always go through.
    pub fn run<D: IoDevice, B: SoundBackend>(
        &mut self,
        verb: Verb,
        ctx: &mut TriggerContext<'_, D, B>,
    ) -> Result<bool> {
        match verb {
            Verb::DriveOn => {
                if !self.on {
                    debug!("Trigger '{}': stale DriveOn dropped", self.name);
                    return Ok(false);
                }
                if let Some(pin) = self.kind.drive_pin() {
                    ctx.drive(pin, PIN_ON)?;
                }
                Ok(false)
            }
            Verb::DriveOff => {
                if let Some(pin) = self.kind.drive_pin() {
                    ctx.drive(pin, PIN_OFF)?;
                }
                Ok(false)
            }
            Verb::End => {
                if !self.on {
                    return Ok(false);
                }
                self.end(ctx)?;
                Ok(true)
            }
            Verb::RescheduleCheck => {
                if !self.on {
                    return Ok(false);
                }
                behaviors::reschedule_check(self, ctx)
            }
        }
    }
}
