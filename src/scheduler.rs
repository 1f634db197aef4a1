//! Due-time event queue.
//!
//! A min-heap of [`Event`]s keyed on `(due, insertion sequence)`, so the
//! earliest due time always pops first and equal due times pop in the
//! order they were pushed.
//!
//! ## Drain protocol
//!
//! The tick loop repeatedly peeks and, while the earliest event is due,
//! pops and runs it, then peeks again.  Running an action may push new
//! events that are already due; they are drained in the same tick.
//! [`EventQueue::pop_due`] packages the peek/pop pair for that loop.

use core::cmp::Ordering;
use core::time::Duration;
use std::collections::BinaryHeap;

use crate::events::Event;

// ═══════════════════════════════════════════════════════════════
//  Heap entry
// ═══════════════════════════════════════════════════════════════

#[derive(Debug)]
struct Entry {
    seq: u64,
    event: Event,
}

impl Entry {
    fn key(&self) -> (Duration, u64) {
        (self.event.due, self.seq)
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap, we want the smallest key on top.
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

// ═══════════════════════════════════════════════════════════════
//  EventQueue
// ═══════════════════════════════════════════════════════════════

/// Time-ordered queue of deferred trigger actions.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event.  O(log n).
    pub fn push(&mut self, event: Event) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.heap.push(Entry { seq, event });
    }

    /// The earliest event without removing it.
    pub fn peek(&self) -> Option<&Event> {
        self.heap.peek().map(|e| &e.event)
    }

    /// Remove and return the earliest event.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty.  Callers must [`peek`](Self::peek)
    /// first; popping an empty queue is a programming error.
    pub fn pop(&mut self) -> Event {
        match self.heap.pop() {
            Some(entry) => entry.event,
            None => panic!("EventQueue::pop on empty queue (peek before popping)"),
        }
    }

    /// Pop the earliest event if its due time is at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<Event> {
        match self.peek() {
            Some(next) if next.due <= now => Some(self.pop()),
            _ => None,
        }
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of pending events already due at `now`.
    pub fn due_count(&self, now: Duration) -> usize {
        self.heap.iter().filter(|e| e.event.due <= now).count()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
