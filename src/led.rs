/// What the RGB status LED on the HAT is showing. The LED is annoying, so it
/// stays off unless something is wrong.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Led {
    #[default]
    Off,
    /// Couldn't reach the weather API
    Unavailable,
    /// The API responded with something other than weather
    Invalid,
}

impl Led {
    /// Which of the red, green and blue channels are lit
    pub fn channels(self) -> [bool; 3] {
        match self {
            Self::Off => [false, false, false],
            Self::Unavailable => [true, false, false],
            // Yellow
            Self::Invalid => [true, true, false],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        assert_eq!(Led::default().channels(), [false; 3]);
        assert_eq!(Led::Unavailable.channels(), [true, false, false]);
        assert_eq!(Led::Invalid.channels(), [true, true, false]);
    }
}
