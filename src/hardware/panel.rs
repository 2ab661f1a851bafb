//! The Display HAT Mini's 320x240 ST7789 panel. All drawing happens in a
//! [Framebuffer], so this only has to bring the controller up and push
//! whole frames to it.

use crate::framebuffer::{Framebuffer, HEIGHT, WIDTH};
use anyhow::anyhow;
use embedded_hal::delay::DelayNs;
use log::{info, trace};
use mipidsi::{
    interface::Interface,
    models::ST7789,
    options::{ColorInversion, Orientation, Rotation},
    Builder, Display, NoResetPin,
};
use std::fmt::Debug;

/// Bytes per SPI write. spidev rejects transfers larger than its buffer
/// size, which defaults to 4096.
pub const BUFFER_SIZE: usize = 4096;

pub struct Panel<DI: Interface<Word = u8>> {
    display: Display<DI, ST7789, NoResetPin>,
}

impl<DI: Interface<Word = u8>> Panel<DI> {
    /// Run the controller's init sequence. The panel is natively 240x320
    /// portrait; the HAT mounts it so that landscape is a 270° turn.
    pub fn new(
        interface: DI,
        delay: &mut impl DelayNs,
    ) -> anyhow::Result<Self> {
        let display = Builder::new(ST7789, interface)
            .display_size(HEIGHT as u16, WIDTH as u16)
            .orientation(Orientation::new().rotate(Rotation::Deg270))
            .invert_colors(ColorInversion::Inverted)
            .init(delay)
            .map_err(|err| anyhow!("Error initializing panel: {err:?}"))?;
        info!("Panel controller initialized");
        Ok(Self { display })
    }

    /// Send a full frame
    pub fn show(&mut self, frame: &Framebuffer) -> anyhow::Result<()> {
        trace!("Writing frame to panel");
        self.display
            .set_pixels(
                0,
                0,
                WIDTH as u16 - 1,
                HEIGHT as u16 - 1,
                frame.colors(),
            )
            .map_err(map_error)
    }
}

/// The interface's error types don't implement Error so we have to map
/// manually
pub fn map_error(error: impl Debug) -> anyhow::Error {
    anyhow!("{error:?}")
}
