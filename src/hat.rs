use crate::{
    config::Config,
    framebuffer::Framebuffer,
    hardware::{
        backlight::SysfsPwm,
        buttons::{Buttons, BUTTON_PINS},
        panel::{Panel, BUFFER_SIZE},
    },
    led::Led,
    settings::Button,
};
use anyhow::{anyhow, Context};
use embedded_hal::digital::OutputPin;
use linux_embedded_hal::{
    spidev::{SpiModeFlags, SpidevOptions},
    sysfs_gpio::Direction,
    Delay, SpidevDevice, SysfsPin,
};
use log::{error, info, trace};
use mipidsi::interface::SpiInterface;

const PIN_DC: u64 = 9; // GPIO/BCM 9, pin 21
/// Red, green, blue. Active-low
const PINS_LED: [u64; 3] = [17, 27, 22];
/// Backlight is on BCM 13
const BACKLIGHT_PWM_CHIP: u32 = 0;
const BACKLIGHT_PWM_CHANNEL: u32 = 1;

/// Pimoroni Display HAT Mini: 320x240 panel, PWM backlight, RGB LED, and four
/// buttons
pub struct DisplayHat {
    panel: Panel<SpiInterface<'static, SpidevDevice, SysfsPin>>,
    backlight: SysfsPwm,
    led: [SysfsPin; 3],
    buttons: Buttons<SysfsPin>,
}

impl DisplayHat {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut spi =
            SpidevDevice::open(&config.spi_device).with_context(|| {
                format!("Error opening SPI device {}", config.spi_device)
            })?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(config.spi_speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options).context("SPI configuration")?;

        let dc =
            init_pin(PIN_DC, Direction::Low).context("Initializing pin D/C")?;
        // Lives as long as the program
        let buffer = vec![0; BUFFER_SIZE].leak();
        let panel = Panel::new(SpiInterface::new(spi, dc, buffer), &mut Delay)?;

        let backlight =
            SysfsPwm::new(BACKLIGHT_PWM_CHIP, BACKLIGHT_PWM_CHANNEL)
                .context("Initializing backlight")?;

        // High is off
        let led = [
            init_pin(PINS_LED[0], Direction::High)
                .context("Initializing LED pin R")?,
            init_pin(PINS_LED[1], Direction::High)
                .context("Initializing LED pin G")?,
            init_pin(PINS_LED[2], Direction::High)
                .context("Initializing LED pin B")?,
        ];

        // The pull-ups for these have to be enabled in config.txt, sysfs
        // can't do it
        let buttons = Buttons::new([
            init_pin(BUTTON_PINS[0], Direction::In)
                .context("Initializing button A")?,
            init_pin(BUTTON_PINS[1], Direction::In)
                .context("Initializing button B")?,
            init_pin(BUTTON_PINS[2], Direction::In)
                .context("Initializing button X")?,
            init_pin(BUTTON_PINS[3], Direction::In)
                .context("Initializing button Y")?,
        ]);
        info!("Display HAT initialized");

        Ok(Self {
            panel,
            backlight,
            led,
            buttons,
        })
    }

    /// Set backlight brightness, 0-1
    pub fn set_backlight(&mut self, brightness: f32) -> anyhow::Result<()> {
        self.backlight
            .set_duty(brightness)
            .context("Error setting backlight")
    }

    pub fn set_led(&mut self, led: Led) -> anyhow::Result<()> {
        trace!("Setting LED to {led:?}");
        for (pin, on) in self.led.iter_mut().zip(led.channels()) {
            // Active-low
            pin.set_state((!on).into())
                .map_err(|err| anyhow!("Error setting LED pin: {err:?}"))?;
        }
        Ok(())
    }

    /// Get buttons pressed since the last call
    pub fn pressed(&mut self) -> anyhow::Result<Vec<Button>> {
        self.buttons.pressed()
    }

    /// Send a full frame to the panel
    pub fn show(&mut self, frame: &Framebuffer) -> anyhow::Result<()> {
        self.panel
            .show(frame)
            .context("Error sending frame to panel")
    }
}

impl Drop for DisplayHat {
    fn drop(&mut self) {
        info!("Turning off display");
        if let Err(err) = self.set_backlight(0.0) {
            error!("{err:?}");
        }
        if let Err(err) = self.set_led(Led::Off) {
            error!("{err:?}");
        }
    }
}

/// Initialize a GPIO pin
fn init_pin(pin_num: u64, direction: Direction) -> anyhow::Result<SysfsPin> {
    let pin = SysfsPin::new(pin_num);
    pin.export().context("Error exporting pin")?;
    while !pin.is_exported() {}
    pin.set_direction(direction)
        .context("Error setting pin direction")?;
    Ok(pin)
}
