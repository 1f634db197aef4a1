//! Outbound controller events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log them, count them in tests,
//! forward them to a show-control desk.

use core::time::Duration;

use embedded_hal::digital::PinState;

use crate::events::TriggerId;
use crate::pins::PinIndex;

/// Structured events emitted by the reactive core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The controller was built; carries the trigger count.
    Started { triggers: usize },

    /// An input pin changed level since the previous scan.
    InputChanged { pin: PinIndex, level: PinState },

    /// A trigger accepted an activation.
    TriggerFired {
        trigger: TriggerId,
        name: String,
        at: Duration,
    },

    /// A trigger returned to `on = false`.
    TriggerEnded {
        trigger: TriggerId,
        name: String,
        at: Duration,
    },

    /// The per-tick action cap was reached; `deferred` actions wait for
    /// the next tick.
    DrainLimitHit { executed: usize, deferred: usize },
}
