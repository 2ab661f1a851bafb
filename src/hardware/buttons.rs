use crate::settings::Button;
use anyhow::anyhow;
use embedded_hal::digital::InputPin;
use log::trace;

/// BCM pin numbers for buttons A, B, X and Y
pub const BUTTON_PINS: [u64; 4] = [5, 6, 16, 24];

/// Poll the four HAT buttons and report new presses. We only poll once per
/// tick, so this doesn't need debouncing; contact bounce settles well within
/// a tick.
pub struct Buttons<P> {
    pins: [(Button, P, ButtonState); 4],
}

impl<P: InputPin> Buttons<P> {
    /// Pins must be given in A, B, X, Y order
    pub fn new(pins: [P; 4]) -> Self {
        let [a, b, x, y] = pins;
        Self {
            pins: [
                (Button::A, a, ButtonState::default()),
                (Button::B, b, ButtonState::default()),
                (Button::X, x, ButtonState::default()),
                (Button::Y, y, ButtonState::default()),
            ],
        }
    }

    /// Get every button that went down since the last poll. Releases are
    /// ignored
    pub fn pressed(&mut self) -> anyhow::Result<Vec<Button>> {
        let mut pressed = Vec::new();
        for (button, pin, state) in &mut self.pins {
            // Buttons are active-low
            let is_low = pin.is_low().map_err(|err| {
                anyhow!("Error reading button {button:?}: {err:?}")
            })?;
            if state.just_pressed(is_low) {
                trace!("Button {button:?} down");
                pressed.push(*button);
            }
        }
        Ok(pressed)
    }
}

/// Falling edge detector for a single button
#[derive(Debug, Default)]
struct ButtonState {
    was_pressed: bool,
}

impl ButtonState {
    fn just_pressed(&mut self, is_low: bool) -> bool {
        let pressed = is_low && !self.was_pressed;
        self.was_pressed = is_low;
        pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, convert::Infallible, rc::Rc};

    /// Input pin whose level is controlled by the test
    #[derive(Clone, Default)]
    struct MockPin {
        low: Rc<Cell<bool>>,
    }

    impl MockPin {
        fn set_low(&self, low: bool) {
            self.low.set(low);
        }
    }

    impl embedded_hal::digital::ErrorType for MockPin {
        type Error = Infallible;
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.low.get())
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(self.low.get())
        }
    }

    #[test]
    fn test_press_reported_once() {
        let pins: [MockPin; 4] = Default::default();
        let mut buttons = Buttons::new(pins.clone());
        assert_eq!(buttons.pressed().unwrap(), vec![]);

        pins[2].set_low(true);
        assert_eq!(buttons.pressed().unwrap(), vec![Button::X]);
        // Still held down, not a new press
        assert_eq!(buttons.pressed().unwrap(), vec![]);

        pins[2].set_low(false);
        assert_eq!(buttons.pressed().unwrap(), vec![]);
        pins[2].set_low(true);
        assert_eq!(buttons.pressed().unwrap(), vec![Button::X]);
    }

    #[test]
    fn test_simultaneous_presses() {
        let pins: [MockPin; 4] = Default::default();
        let mut buttons = Buttons::new(pins.clone());
        pins[3].set_low(true);
        pins[0].set_low(true);
        assert_eq!(buttons.pressed().unwrap(), vec![Button::A, Button::Y]);
    }
}
