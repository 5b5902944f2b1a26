//! RemoteStart firmware library.
//!
//! Vehicle remote-access / remote-start controller: staged ignition with a
//! single-owner starter latch, central-lock solenoid pulses with hazard and
//! siren signalling, and a once-a-day warm-up run.  Everything above the
//! adapters is pure logic driven by a fixed-order cooperative tick, so the
//! whole controller runs on the host against mock ports.  ESP-IDF code is
//! guarded by `#[cfg(feature = "espidf")]` inside each adapter.

#![deny(unused_must_use)]

pub mod app;
pub mod channels;
pub mod clock;
pub mod config;
pub mod door;
pub mod engine;
pub mod error;
pub mod pins;
pub mod time;
pub mod warmup;

pub mod adapters;
pub mod drivers;
