//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the arbitration rules for the remote-start
//! controller: command grammar, outward notices, and the [`Controller`]
//! that owns every state machine and runs the cooperative tick.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.
//!
//! [`Controller`]: service::Controller

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
