//! GPIO pin assignments for the remote-start main board (ESP32-WROOM).
//!
//! Single source of truth — the hardware adapter references this module
//! rather than hard-coding pin numbers.  Change a pin here and it
//! propagates everywhere.

// ---------------------------------------------------------------------------
// Ignition stages (relay drivers, active HIGH)
// ---------------------------------------------------------------------------

/// Accessory relay.
pub const ACC_GPIO: i32 = 25;
/// Ignition relay.
pub const IG_GPIO: i32 = 26;
/// Starter-motor relay.  Only ever driven through the starter latch.
pub const STARTER_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Body outputs
// ---------------------------------------------------------------------------

/// Central-lock solenoid, lock coil.
pub const LOCK_GPIO: i32 = 4;
/// Central-lock solenoid, unlock coil.
pub const UNLOCK_GPIO: i32 = 16;
/// Hazard flasher relay.
pub const HAZARD_GPIO: i32 = 17;
/// Dashboard "armed" indicator.
pub const INDICATOR_GPIO: i32 = 23;
/// Auxiliary lamp relay.
pub const LAMP_GPIO: i32 = 32;
/// Siren / alarm output.
pub const ALARM_GPIO: i32 = 33;
/// Power LED next to the start button.  GPIO21/22 are reserved for I2C.
pub const POWER_LED_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Start button, active LOW with internal pull-up.
pub const BUTTON_GPIO: i32 = 18;
/// 433 MHz receiver channel A (lock).  Input-only pin.
pub const REMOTE_A_GPIO: i32 = 34;
/// 433 MHz receiver channel B (unlock).  Input-only pin.
pub const REMOTE_B_GPIO: i32 = 35;
/// 433 MHz receiver channel C (start / reset).  Input-only pin.
pub const REMOTE_C_GPIO: i32 = 36;
/// 433 MHz receiver channel D (alarm toggle).  Input-only pin.
pub const REMOTE_D_GPIO: i32 = 39;

