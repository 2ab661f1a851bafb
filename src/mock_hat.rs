use crate::{
    config::Config, framebuffer::Framebuffer, led::Led, settings::Button,
};
use log::{info, trace};
use std::collections::VecDeque;

/// Mock HAT, to allow compiling/running tests on non-Pi machines. Records
/// whatever gets sent to it.
#[derive(Debug, Default)]
pub struct DisplayHat {
    pub brightness: f32,
    pub led: Led,
    /// Number of frames sent
    pub frames: usize,
    /// Button presses to report, one entry per call to [Self::pressed]
    pub presses: VecDeque<Vec<Button>>,
}

impl DisplayHat {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        info!(
            "Using mock HAT in place of {} @ {}Hz",
            config.spi_device, config.spi_speed_hz
        );
        Ok(Self::default())
    }

    pub fn set_backlight(&mut self, brightness: f32) -> anyhow::Result<()> {
        self.brightness = brightness;
        Ok(())
    }

    pub fn set_led(&mut self, led: Led) -> anyhow::Result<()> {
        trace!("Setting LED to {led:?}");
        self.led = led;
        Ok(())
    }

    pub fn pressed(&mut self) -> anyhow::Result<Vec<Button>> {
        Ok(self.presses.pop_front().unwrap_or_default())
    }

    pub fn show(&mut self, _: &Framebuffer) -> anyhow::Result<()> {
        self.frames += 1;
        Ok(())
    }
}
