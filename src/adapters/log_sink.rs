//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured controller events to the
//! `log` facade, one line per event.  Another sink (show-control bridge,
//! test recorder) would implement the same trait.

use log::info;

use crate::app::events::ControllerEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`ControllerEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &ControllerEvent) {
        match event {
            ControllerEvent::Started { triggers } => {
                info!("START | triggers={}", triggers);
            }
            ControllerEvent::InputChanged { pin, level } => {
                info!("INPUT | pin={} level={:?}", pin, level);
            }
            ControllerEvent::TriggerFired { trigger, name, at } => {
                info!("FIRE  | {} '{}' at={:.3}s", trigger, name, at.as_secs_f64());
            }
            ControllerEvent::TriggerEnded { trigger, name, at } => {
                info!("END   | {} '{}' at={:.3}s", trigger, name, at.as_secs_f64());
            }
            ControllerEvent::DrainLimitHit { executed, deferred } => {
                info!("DRAIN | limit hit, executed={} deferred={}", executed, deferred);
            }
        }
    }
}
