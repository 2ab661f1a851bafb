//! Drivers for the pieces of the Display HAT Mini, one submodule each. Only
//! the real [DisplayHat](crate::hat::DisplayHat) uses them; off the Pi they're
//! built just for their tests.

pub mod backlight;
pub mod buttons;
pub mod panel;
