use anyhow::{bail, Context};
use log::{debug, info, trace};
use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

/// A hardware PWM channel, controlled through sysfs. On the Pi, the backlight
/// pin (BCM 13) is PWM channel 1, once enabled with
/// `dtoverlay=pwm,pin=13,func=4` in config.txt.
#[derive(Debug)]
pub struct SysfsPwm {
    chip: PathBuf,
    channel: u32,
    period_ns: u32,
    /// Last duty cycle written, so we don't hammer sysfs every tick
    duty_ns: Option<u32>,
}

impl SysfsPwm {
    const ROOT: &'static str = "/sys/class/pwm";
    /// 2kHz, well above visible flicker
    const PERIOD_NS: u32 = 500_000;
    /// How long the kernel and udev get to set up a freshly exported channel
    const EXPORT_TIMEOUT: Duration = Duration::from_secs(1);

    pub fn new(chip: u32, channel: u32) -> anyhow::Result<Self> {
        Self::with_root(Self::ROOT, chip, channel)
    }

    /// Export and enable a channel under the given sysfs root
    pub fn with_root(
        root: impl AsRef<Path>,
        chip: u32,
        channel: u32,
    ) -> anyhow::Result<Self> {
        let chip = root.as_ref().join(format!("pwmchip{chip}"));
        let pwm = Self {
            chip,
            channel,
            period_ns: Self::PERIOD_NS,
            duty_ns: None,
        };

        if !pwm.channel_dir().exists() {
            write(&pwm.chip.join("export"), channel)
                .context("Error exporting PWM channel")?;
            pwm.wait_for_export()?;
        }
        write(&pwm.channel_dir().join("period"), pwm.period_ns)?;
        write(&pwm.channel_dir().join("enable"), 1)?;
        info!("PWM channel {} enabled", pwm.channel_dir().display());
        Ok(pwm)
    }

    /// Set duty cycle, as a fraction 0-1
    pub fn set_duty(&mut self, fraction: f32) -> anyhow::Result<()> {
        let duty_ns =
            (fraction.clamp(0.0, 1.0) * self.period_ns as f32).round() as u32;
        if self.duty_ns != Some(duty_ns) {
            debug!("Setting PWM duty cycle to {duty_ns}ns");
            write(&self.channel_dir().join("duty_cycle"), duty_ns)?;
            self.duty_ns = Some(duty_ns);
        }
        Ok(())
    }

    /// The channel directory shows up asynchronously after export, and only
    /// becomes writable once udev has fixed its permissions
    fn wait_for_export(&self) -> anyhow::Result<()> {
        let period = self.channel_dir().join("period");
        let start = Instant::now();
        while OpenOptions::new().write(true).open(&period).is_err() {
            if start.elapsed() > Self::EXPORT_TIMEOUT {
                bail!(
                    "Timed out waiting for {} to become writable",
                    period.display()
                );
            }
            thread::sleep(Duration::from_millis(10));
        }
        trace!("PWM channel exported after {:?}", start.elapsed());
        Ok(())
    }

    fn channel_dir(&self) -> PathBuf {
        self.chip.join(format!("pwm{}", self.channel))
    }
}

fn write(path: &Path, value: u32) -> anyhow::Result<()> {
    fs::write(path, value.to_string())
        .with_context(|| format!("Error writing {value} to {}", path.display()))
}
