//! Deferred work scheduled by triggers.
//!
//! Scheduled actions are plain data (a trigger identifier plus a verb)
//! rather than captured closures.  The controller looks the trigger up and
//! hands it the verb when the event comes due.
//!
//! ```text
//! ┌──────────────┐  push   ┌──────────────┐  pop_due  ┌──────────────┐
//! │ Trigger      │───────▶ │  EventQueue  │─────────▶ │ Controller   │
//! │ fire / run   │         │  (min-heap)  │           │ dispatch     │
//! └──────────────┘         └──────────────┘           └──────┬───────┘
//!        ▲                                                   │
//!        └──────────────── Trigger::run(verb) ◀──────────────┘
//! ```

use core::fmt;
use core::time::Duration;

/// Index of a trigger in the controller's trigger table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriggerId(pub usize);

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a trigger should do when its scheduled event runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Energise the drive output.
    DriveOn,
    /// De-energise the drive output.
    DriveOff,
    /// Drive OFF and return the trigger to `on = false`.
    End,
    /// Pulse variant: start another cycle, or end once `end_at` has passed.
    RescheduleCheck,
}

/// A verb addressed to one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub trigger: TriggerId,
    pub verb: Verb,
}

impl Action {
    pub const fn new(trigger: TriggerId, verb: Verb) -> Self {
        Self { trigger, verb }
    }
}

/// An action with the uptime at which it becomes due.
///
/// Created when a trigger schedules work; consumed exactly once when the
/// controller pops and runs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub due: Duration,
    pub action: Action,
}

impl Event {
    pub const fn new(due: Duration, action: Action) -> Self {
        Self { due, action }
    }
}
