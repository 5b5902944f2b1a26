//! Hardware adapter — bridges GPIO pins to domain port traits.
//!
//! Owns one `embedded-hal` output pin per [`Output`] and one input pin per
//! [`InputLine`], exposing them through [`ActuatorPort`] and
//! [`InputPort`].  This is the only module in the system that touches
//! actual pins.  On ESP32 the pins are `PinDriver`s; host tests plug in
//! recording fakes.
//!
//! Electrical polarity is resolved here: the start button is wired
//! active-low with a pull-up, every other line is active-high.

use embedded_hal::digital::{InputPin, OutputPin, PinState};
use log::warn;

use crate::app::ports::{ActuatorPort, InputLine, InputPort, Output};

/// Concrete adapter that combines all GPIO behind port traits.
pub struct GpioHardware<O, I> {
    /// Indexed by [`Output::index`].
    outputs: [O; Output::COUNT],
    /// Last commanded level per output.
    levels: [bool; Output::COUNT],
    /// Indexed by [`InputLine::index`].
    inputs: [I; InputLine::COUNT],
}

impl<O, I> GpioHardware<O, I>
where
    O: OutputPin,
    I: InputPin,
{
    /// Takes ownership of the pins and drives every output low.
    pub fn new(outputs: [O; Output::COUNT], inputs: [I; InputLine::COUNT]) -> Self {
        let mut hw = Self {
            outputs,
            levels: [false; Output::COUNT],
            inputs,
        };
        hw.all_off();
        hw
    }

    const fn active_low(line: InputLine) -> bool {
        matches!(line, InputLine::Button)
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<O, I> ActuatorPort for GpioHardware<O, I>
where
    O: OutputPin,
    I: InputPin,
{
    fn set_output(&mut self, output: Output, on: bool) {
        let idx = output.index();
        if let Err(e) = self.outputs[idx].set_state(PinState::from(on)) {
            warn!("GPIO: failed to drive {:?} -> {}: {:?}", output, on, e);
            return;
        }
        self.levels[idx] = on;
    }

    fn is_on(&self, output: Output) -> bool {
        self.levels[output.index()]
    }
}

// ── InputPort implementation ──────────────────────────────────

impl<O, I> InputPort for GpioHardware<O, I>
where
    O: OutputPin,
    I: InputPin,
{
    fn is_asserted(&mut self, line: InputLine) -> bool {
        match self.inputs[line.index()].is_high() {
            Ok(high) => high != Self::active_low(line),
            Err(e) => {
                warn!("GPIO: failed to read {:?}: {:?}", line, e);
                false
            }
        }
    }
}
