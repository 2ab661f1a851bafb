use crate::{
    config::Config,
    display::Renderer,
    hat::DisplayHat,
    led::Led,
    settings::Settings,
    weather::{Report, WeatherClient},
};
use log::{debug, error, info, trace};
use std::time::Duration;

/// The whole program, minus the loop. Every tick re-sends the current frame
/// to the panel; every [Refresh::EVERY] ticks the weather is re-fetched and
/// the frame redrawn.
pub struct App {
    hat: DisplayHat,
    weather: WeatherClient,
    renderer: Renderer,
    settings: Settings,
    refresh: Refresh,
}

impl App {
    pub const INTERVAL: Duration = Duration::from_millis(100);

    pub fn new(config: &Config, mut hat: DisplayHat) -> anyhow::Result<Self> {
        let mut renderer = Renderer::new(&config.icon_dir);
        renderer.show_icon(Renderer::BOOT_ICON);
        hat.set_led(Led::Off)?;
        Ok(Self {
            hat,
            weather: WeatherClient::new(config),
            renderer,
            settings: Settings::new(config.brightness),
            refresh: Refresh::default(),
        })
    }

    pub fn tick(&mut self) -> anyhow::Result<()> {
        trace!("Running tick");
        for button in self.hat.pressed()? {
            if self.settings.apply(button) {
                self.refresh.force();
            }
        }

        self.hat
            .set_backlight(self.settings.brightness.as_fraction())?;
        self.hat.show(self.renderer.frame())?;

        if self.refresh.tick() {
            let report = self.weather.fetch();
            self.show_report(report)?;
        }
        Ok(())
    }

    /// Update the frame and LED from a fetch. The frame will be sent on the
    /// next tick
    fn show_report(&mut self, report: Report) -> anyhow::Result<()> {
        let led = match report {
            Report::Current(observation) => {
                info!(
                    "{}°C, {}",
                    observation.temperature, observation.condition_text
                );
                match self
                    .renderer
                    .show_observation(&observation, &self.settings)
                {
                    Ok(()) => Led::Off,
                    Err(err) => {
                        error!("{err:?}");
                        self.renderer.show_invalid();
                        Led::Invalid
                    }
                }
            }
            Report::Invalid(status) => {
                debug!("Showing invalid response ({status})");
                self.renderer.show_invalid();
                Led::Invalid
            }
            Report::Malformed => {
                debug!("Showing malformed response");
                self.renderer.show_invalid();
                Led::Invalid
            }
            // Leave the last frame up
            Report::Unavailable => Led::Unavailable,
        };
        self.hat.set_led(led)
    }
}

/// Counts ticks until the next weather fetch
#[derive(Debug)]
struct Refresh {
    ticks: u32,
}

impl Refresh {
    /// ~10s
    const EVERY: u32 = 100;

    /// Count a tick. Return true if a fetch is due, and start counting again
    fn tick(&mut self) -> bool {
        self.ticks = self.ticks.saturating_add(1);
        if self.ticks >= Self::EVERY {
            self.ticks = 0;
            true
        } else {
            false
        }
    }

    /// Make the next tick due
    fn force(&mut self) {
        self.ticks = Self::EVERY;
    }
}

impl Default for Refresh {
    /// Starts out due, so the first tick fetches
    fn default() -> Self {
        Self { ticks: Self::EVERY }
    }
}

// The tests drive the mock HAT, which is only built off the Pi
#[cfg(all(
    test,
    not(all(
        target_os = "linux",
        any(target_arch = "arm", target_arch = "aarch64")
    ))
))]
mod tests {
    use super::*;
    use crate::{
        settings::{Button, TemperatureUnit},
        weather::{tests::observation, Observation},
    };
    use embedded_graphics::{
        geometry::Point,
        pixelcolor::{Rgb565, RgbColor},
    };

    /// Nothing listens on port 1, so fetches fail fast
    fn app() -> App {
        let config: Config = serde_json::from_str(
            r#"{
                "location": "Pluneret",
                "api_key": "abc123",
                "api_host": "http://127.0.0.1:1",
                "icon_dir": "/nonexistent",
                "brightness": 0.5
            }"#,
        )
        .unwrap();
        let hat = DisplayHat::new(&config).unwrap();
        App::new(&config, hat).unwrap()
    }

    #[test]
    fn test_refresh() {
        let mut refresh = Refresh::default();
        assert!(refresh.tick());
        for _ in 0..99 {
            assert!(!refresh.tick());
        }
        assert!(refresh.tick());
        assert!(!refresh.tick());

        refresh.force();
        assert!(refresh.tick());
        assert!(!refresh.tick());
    }

    #[test]
    fn test_tick_unavailable() {
        let mut app = app();
        app.tick().unwrap();
        assert_eq!(app.hat.brightness, 0.5);
        assert_eq!(app.hat.frames, 1);
        assert_eq!(app.hat.led, Led::Unavailable);
        // Boot screen is left up
        assert_eq!(app.renderer.frame().pixel(Point::zero()), Rgb565::WHITE);

        app.tick().unwrap();
        assert_eq!(app.hat.frames, 2);
    }

    #[test]
    fn test_buttons() {
        let mut app = app();
        app.tick().unwrap();
        app.hat.presses.push_back(vec![Button::A, Button::X]);
        app.hat.presses.push_back(vec![Button::B]);
        app.hat.presses.push_back(vec![Button::B]);

        // Unit change forces a fetch on the same tick
        app.hat.set_led(Led::Off).unwrap();
        app.tick().unwrap();
        assert_eq!(app.hat.brightness, 0.6);
        assert_eq!(app.settings.unit, TemperatureUnit::Fahrenheit);
        assert_eq!(app.hat.led, Led::Unavailable);

        // Brightness alone doesn't
        app.hat.set_led(Led::Off).unwrap();
        app.tick().unwrap();
        app.tick().unwrap();
        assert_eq!(app.hat.brightness, 0.4);
        assert_eq!(app.hat.led, Led::Off);
    }

    #[test]
    fn test_show_report() {
        let mut app = app();
        app.show_report(Report::Invalid("invalid key".into()))
            .unwrap();
        assert_eq!(app.hat.led, Led::Invalid);
        assert_eq!(app.renderer.frame().pixel(Point::zero()), Rgb565::RED);

        app.show_report(Report::Current(observation())).unwrap();
        assert_eq!(app.hat.led, Led::Off);
        assert_eq!(app.renderer.frame().pixel(Point::zero()), Rgb565::WHITE);

        // Failed fetch keeps the previous frame
        let frame = app.renderer.frame().clone();
        app.show_report(Report::Unavailable).unwrap();
        assert_eq!(app.hat.led, Led::Unavailable);
        assert_eq!(app.renderer.frame(), &frame);

        app.show_report(Report::Malformed).unwrap();
        assert_eq!(app.hat.led, Led::Invalid);
        assert_eq!(app.renderer.frame().pixel(Point::zero()), Rgb565::RED);
    }

    /// Text the font can't draw is shown like any other bad response, rather
    /// than taking the program down
    #[test]
    fn test_show_report_unrenderable() {
        let mut app = app();
        let observation = Observation {
            wind_direction: "西南风".into(),
            ..observation()
        };
        app.show_report(Report::Current(observation)).unwrap();
        assert_eq!(app.hat.led, Led::Invalid);
        assert_eq!(app.renderer.frame().pixel(Point::zero()), Rgb565::RED);
    }
}
