//! Per-variant start and end behaviours, selected by [`TriggerKind`] tag.
//!
//! Plain functions over `&mut Trigger`, with no closures and no
//! dynamic dispatch.  Every follow-up action is pushed onto the event queue as
//! `(trigger id, verb)` data.
//!
//! ```text
//!  TimedRelay   t0: DriveOn           t0+duration: End
//!
//!  Pulse        t0: DriveOn   t0+pd: DriveOff   t0+pi: RescheduleCheck
//!                                                  │
//!               now < end_at ──▶ next cycle ◀──────┤
//!               now >= end_at ─▶ end()  ◀──────────┘
//! ```

use core::time::Duration;

use log::{debug, warn};

use super::context::TriggerContext;
use super::{Trigger, TriggerKind};
use crate::app::ports::{IoDevice, SoundBackend};
use crate::error::Result;
use crate::events::{Action, TriggerId, Verb};
use crate::pins::PIN_OFF;

/// Whether an activation finishes inside `fire()` or later via the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Scheduled,
    Immediate,
}

// ═══════════════════════════════════════════════════════════════
//  Dispatch
// ═══════════════════════════════════════════════════════════════

pub(super) fn start<D: IoDevice, B: SoundBackend>(
    trigger: &mut Trigger,
    ctx: &mut TriggerContext<'_, D, B>,
) -> Completion {
    match trigger.kind {
        TriggerKind::TimedRelay { duration, .. } => {
            timed_start(trigger.id, duration, ctx);
            Completion::Scheduled
        }
        TriggerKind::Pulse { .. } => {
            pulse_start(trigger, ctx);
            Completion::Scheduled
        }
        TriggerKind::SoundOnly => Completion::Immediate,
    }
}

pub(super) fn end<D: IoDevice, B: SoundBackend>(
    trigger: &mut Trigger,
    ctx: &mut TriggerContext<'_, D, B>,
) -> Result<()> {
    if let Some(pin) = trigger.kind.drive_pin() {
        ctx.drive(pin, PIN_OFF)?;
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
//  Timed relay
// ═══════════════════════════════════════════════════════════════

fn timed_start<D: IoDevice, B: SoundBackend>(
    id: TriggerId,
    duration: Duration,
    ctx: &mut TriggerContext<'_, D, B>,
) {
    ctx.schedule(Duration::ZERO, Action::new(id, Verb::DriveOn));
    ctx.schedule(duration, Action::new(id, Verb::End));
}

// ═══════════════════════════════════════════════════════════════
//  Pulse ("wig-wag")
// ═══════════════════════════════════════════════════════════════

fn pulse_start<D: IoDevice, B: SoundBackend>(
    trigger: &mut Trigger,
    ctx: &mut TriggerContext<'_, D, B>,
) {
    if let TriggerKind::Pulse {
        duration,
        pulse_interval,
        pulse_duration,
        ref mut end_at,
        ..
    } = trigger.kind
    {
        if pulse_duration >= pulse_interval {
            warn!(
                "Trigger '{}': pulse_duration {:?} >= pulse_interval {:?}, pulses will overlap",
                trigger.name, pulse_duration, pulse_interval
            );
        }
        *end_at = ctx.now + duration;
        pulse_cycle(trigger.id, pulse_interval, pulse_duration, ctx);
    }
}

fn pulse_cycle<D: IoDevice, B: SoundBackend>(
    id: TriggerId,
    pulse_interval: Duration,
    pulse_duration: Duration,
    ctx: &mut TriggerContext<'_, D, B>,
) {
    ctx.schedule(Duration::ZERO, Action::new(id, Verb::DriveOn));
    ctx.schedule(pulse_duration, Action::new(id, Verb::DriveOff));
    ctx.schedule(pulse_interval, Action::new(id, Verb::RescheduleCheck));
}

/// Start another cycle while before `end_at`, otherwise end.
/// Returns whether the trigger ended.
pub(super) fn reschedule_check<D: IoDevice, B: SoundBackend>(
    trigger: &mut Trigger,
    ctx: &mut TriggerContext<'_, D, B>,
) -> Result<bool> {
    let TriggerKind::Pulse {
        pulse_interval,
        pulse_duration,
        end_at,
        ..
    } = trigger.kind
    else {
        return Ok(false);
    };

    if ctx.now < end_at {
        debug!("Trigger '{}': pulse cycle", trigger.name);
        pulse_cycle(trigger.id, pulse_interval, pulse_duration, ctx);
        Ok(false)
    } else {
        trigger.end(ctx)?;
        Ok(true)
    }
}
