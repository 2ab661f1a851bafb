use anyhow::Context;
use log::info;
use serde::Deserialize;
use std::fs::File;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Location query for the weather API, e.g. a city name
    pub location: String,
    pub api_key: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_api_host")]
    pub api_host: String,
    /// Without a timeout a stalled request would freeze the display loop
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Directory holding one `<condition code>.bmp` per weather condition
    #[serde(default = "default_icon_dir")]
    pub icon_dir: String,
    #[serde(default = "default_spi_device")]
    pub spi_device: String,
    #[serde(default = "default_spi_speed_hz")]
    pub spi_speed_hz: u32,
    /// Backlight level on startup, 0-1
    #[serde(default = "default_brightness")]
    pub brightness: f32,
}

impl Config {
    const PATH: &'static str = "./config.json";

    pub fn load() -> anyhow::Result<Self> {
        info!("Loading config from `{}`", Self::PATH);
        let file = File::open(Self::PATH)
            .with_context(|| format!("Error opening config file {}", Self::PATH))?;
        serde_json::from_reader(file)
            .context(format!("Error parsing config file {}", Self::PATH))
    }

    /// Full URL for the current-conditions endpoint
    pub fn lookup_url(&self) -> String {
        format!(
            "{}/s6/weather/now?location={}&key={}&lang={}",
            self.api_host, self.location, self.api_key, self.lang
        )
    }
}

fn default_lang() -> String {
    "en".into()
}

fn default_api_host() -> String {
    "https://free-api.heweather.net".into()
}

fn default_request_timeout_secs() -> u64 {
    5
}

fn default_icon_dir() -> String {
    "./icons".into()
}

fn default_spi_device() -> String {
    "/dev/spidev0.1".into()
}

fn default_spi_speed_hz() -> u32 {
    60_000_000
}

fn default_brightness() -> f32 {
    1.0
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    serde_json::from_str(r#"{"location": "Pluneret", "api_key": "abc123"}"#)
        .unwrap()
}
