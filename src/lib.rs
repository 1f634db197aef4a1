//! Prop controller library.
//!
//! Exposes the reactive core (world state, triggers, event queue, sound
//! channels), the port traits it is driven through, and the stock
//! adapters, for the binary and for integration testing.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod pins;
pub mod scheduler;
pub mod sound;
pub mod trigger;
pub mod world;
