//! Fuzz target: `EventQueue`
//!
//! Drives arbitrary push / pop_due sequences and verifies:
//! - No panics
//! - `pop_due(now)` never returns an event due after `now`
//! - Within one drain, pops come out in (due, push order) order
//! - `len()` matches pushes minus pops
//!
//! cargo fuzz run fuzz_event_queue

#![no_main]

use std::time::Duration;

use libfuzzer_sys::fuzz_target;
use propctl::events::{Action, Event, TriggerId, Verb};
use propctl::scheduler::EventQueue;

fuzz_target!(|data: &[u8]| {
    let mut queue = EventQueue::new();
    let mut seq = 0usize;
    let mut expected_len = 0usize;

    for chunk in data.chunks(2) {
        let [op, arg] = *chunk else {
            break;
        };
        if op & 1 == 0 {
            // Trigger id doubles as the push sequence number.
            queue.push(Event::new(
                Duration::from_millis(u64::from(arg)),
                Action::new(TriggerId(seq), Verb::DriveOn),
            ));
            seq += 1;
            expected_len += 1;
        } else {
            let now = Duration::from_millis(u64::from(arg));
            let mut last: Option<(Duration, usize)> = None;
            while let Some(event) = queue.pop_due(now) {
                assert!(event.due <= now);
                let key = (event.due, event.action.trigger.0);
                if let Some(prev) = last {
                    assert!(key > prev, "out of order: {prev:?} then {key:?}");
                }
                last = Some(key);
                expected_len -= 1;
            }
        }
        assert_eq!(queue.len(), expected_len);
    }
});
