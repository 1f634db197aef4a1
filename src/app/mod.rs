//! Application core: reactive domain logic, zero direct I/O.
//!
//! This module wires the world-state snapshot, the trigger table, the
//! event queue and the sound-channel manager into one tick loop.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
