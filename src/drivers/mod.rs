//! Pin-level helpers shared by the domain components.

pub mod blink;
pub mod input;
