use log::debug;

/// One of the four buttons on the HAT
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Button {
    A,
    B,
    X,
    Y,
}

/// User-controlled display settings. These live in memory only, and reset on
/// every restart
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Settings {
    pub brightness: Brightness,
    pub unit: TemperatureUnit,
    pub wind_format: WindFormat,
}

impl Settings {
    pub fn new(brightness: f32) -> Self {
        Self {
            brightness: Brightness::from_fraction(brightness),
            ..Default::default()
        }
    }

    /// Handle a button press. Return true if the screen content changed and
    /// should be redrawn ASAP
    pub fn apply(&mut self, button: Button) -> bool {
        let redraw = match button {
            Button::A => {
                self.brightness.up();
                false
            }
            Button::B => {
                self.brightness.down();
                false
            }
            Button::X => {
                self.unit = self.unit.toggle();
                true
            }
            Button::Y => {
                self.wind_format = self.wind_format.toggle();
                true
            }
        };
        debug!("Button {button:?} pressed; settings are now {self:?}");
        redraw
    }
}

/// Backlight level, in tenths. Integer steps mean ten presses always land
/// exactly on 0 or 1.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Brightness(u8);

impl Brightness {
    const MAX: u8 = 10;

    pub fn from_fraction(fraction: f32) -> Self {
        let tenths = (fraction.clamp(0.0, 1.0) * Self::MAX as f32).round();
        Self(tenths as u8)
    }

    pub fn as_fraction(self) -> f32 {
        self.0 as f32 / Self::MAX as f32
    }

    pub fn up(&mut self) {
        self.0 = (self.0 + 1).min(Self::MAX);
    }

    pub fn down(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn toggle(self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Celsius => 'C',
            Self::Fahrenheit => 'F',
        }
    }
}

/// How to show wind direction
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum WindFormat {
    /// N, SE, etc.
    #[default]
    Cardinal,
    Degrees,
}

impl WindFormat {
    pub fn toggle(self) -> Self {
        match self {
            Self::Cardinal => Self::Degrees,
            Self::Degrees => Self::Cardinal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brightness_clamp() {
        let mut settings = Settings::default();
        assert_eq!(settings.brightness.as_fraction(), 1.0);
        assert!(!settings.apply(Button::A));
        assert_eq!(settings.brightness.as_fraction(), 1.0);

        for _ in 0..15 {
            assert!(!settings.apply(Button::B));
        }
        assert_eq!(settings.brightness.as_fraction(), 0.0);

        settings.apply(Button::A);
        settings.apply(Button::A);
        settings.apply(Button::A);
        assert_eq!(settings.brightness.as_fraction(), 0.3);
    }

    #[test]
    fn test_brightness_from_fraction() {
        assert_eq!(Brightness::from_fraction(0.54), Brightness(5));
        assert_eq!(Brightness::from_fraction(-3.0), Brightness(0));
        assert_eq!(Brightness::from_fraction(7.0), Brightness(10));
        assert_eq!(Settings::new(0.2).brightness.as_fraction(), 0.2);
    }

    #[test]
    fn test_toggles_force_redraw() {
        let mut settings = Settings::default();
        assert!(settings.apply(Button::X));
        assert_eq!(settings.unit, TemperatureUnit::Fahrenheit);
        assert!(settings.apply(Button::X));
        assert_eq!(settings.unit, TemperatureUnit::Celsius);

        assert!(settings.apply(Button::Y));
        assert_eq!(settings.wind_format, WindFormat::Degrees);
        assert!(settings.apply(Button::Y));
        assert_eq!(settings.wind_format, WindFormat::Cardinal);
    }
}
