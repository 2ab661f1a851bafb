use crate::{config::Config, settings::TemperatureUnit};
use anyhow::Context;
use chrono::NaiveDateTime;
use embedded_graphics::pixelcolor::Rgb888;
use log::{debug, error, info, warn};
use serde::{Deserialize, Deserializer};
use std::{fmt::Display, str::FromStr, time::Duration};

/// Gotta know weather or not it's gonna rain
#[derive(Debug)]
pub struct WeatherClient {
    agent: ureq::Agent,
    url: String,
}

impl WeatherClient {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build();
        Self {
            agent,
            url: config.lookup_url(),
        }
    }

    /// Fetch current conditions. This blocks until the request completes or
    /// times out. Errors are logged here and reduced to a [Report], because
    /// the caller has nothing to do with them but show them.
    pub fn fetch(&self) -> Report {
        info!("Fetching weather from {}", self.url);
        let body = match self.agent.get(&self.url).call() {
            Ok(response) => match response.into_string() {
                Ok(body) => body,
                Err(err) => {
                    error!("Error reading weather response: {err}");
                    return Report::Unavailable;
                }
            },
            Err(err) => {
                error!("Error fetching weather: {err}");
                return Report::Unavailable;
            }
        };

        match parse(&body) {
            Ok(envelope) => envelope.into_report(),
            Err(err) => {
                warn!("{err:?}");
                Report::Malformed
            }
        }
    }
}

/// Outcome of one weather fetch
#[derive(Clone, Debug, PartialEq)]
pub enum Report {
    Current(Observation),
    /// The API answered, but not with weather. Contains the API status
    Invalid(String),
    /// The API answered with something that isn't a weather envelope at all
    Malformed,
    /// Couldn't reach the API at all
    Unavailable,
}

/// Top-level response body
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(rename = "HeWeather6")]
    results: Vec<LocationResult>,
}

#[derive(Debug, Deserialize)]
struct LocationResult {
    status: String,
    update: Option<Update>,
    now: Option<Observation>,
}

#[derive(Debug, Deserialize)]
struct Update {
    /// Local time at the location, e.g. `2022-02-22 10:45`
    loc: String,
}

impl Envelope {
    pub fn into_report(self) -> Report {
        let Some(result) = self.results.into_iter().next() else {
            warn!("Weather response contained no results");
            return Report::Malformed;
        };

        match result {
            LocationResult {
                status,
                now: Some(observation),
                update,
            } if status == "ok" => {
                if let Some(update) = update {
                    match NaiveDateTime::parse_from_str(
                        &update.loc,
                        "%Y-%m-%d %H:%M",
                    ) {
                        Ok(time) => info!("Weather observed at {time}"),
                        Err(err) => warn!(
                            "Invalid update time `{}`: {err}",
                            update.loc
                        ),
                    }
                }
                debug!("{observation:?}");
                Report::Current(observation)
            }
            LocationResult { status, .. } => {
                warn!("Weather API returned status `{status}`");
                Report::Invalid(status)
            }
        }
    }
}

/// Parse a response body
pub fn parse(body: &str) -> anyhow::Result<Envelope> {
    serde_json::from_str(body).context("Error parsing weather response")
}

/// Current conditions at one location. The API encodes every number as a
/// string. Only the temperature gets parsed, because it's the only value we
/// compute with. Everything else is shown as given, or not at all, so an odd
/// value there can't spoil the rest of the response.
#[allow(dead_code)]
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Observation {
    /// Cloud cover, percent
    #[serde(default)]
    pub cloud: String,
    /// Also the icon file name
    #[serde(rename = "cond_code")]
    pub condition_code: String,
    #[serde(rename = "cond_txt", default)]
    pub condition_text: String,
    /// Feels-like temperature, Celsius
    #[serde(rename = "fl", default)]
    pub feels_like: String,
    /// Percent
    #[serde(rename = "hum")]
    pub humidity: String,
    /// mm
    #[serde(rename = "pcpn", default)]
    pub precipitation: String,
    /// mbar
    #[serde(rename = "pres")]
    pub pressure: String,
    /// Celsius
    #[serde(rename = "tmp", deserialize_with = "from_str")]
    pub temperature: i32,
    /// km
    #[serde(rename = "vis", default)]
    pub visibility: String,
    /// Degrees clockwise from north
    #[serde(rename = "wind_deg")]
    pub wind_degree: String,
    /// N, SE, etc.
    #[serde(rename = "wind_dir")]
    pub wind_direction: String,
    /// Beaufort scale. Can be a range, e.g. `3-4`
    #[serde(rename = "wind_sc")]
    pub wind_force: String,
    /// km/h
    #[serde(rename = "wind_spd", default)]
    pub wind_speed: String,
}

impl Observation {
    /// Temperature, rounded to the nearest degree in the given unit
    pub fn temperature(&self, unit: TemperatureUnit) -> i32 {
        match unit {
            TemperatureUnit::Celsius => self.temperature,
            TemperatureUnit::Fahrenheit => {
                (1.8 * self.temperature as f32 + 32.0).round() as i32
            }
        }
    }
}

/// Color to draw a temperature in: blue when cold, red when hot. Anything
/// outside [-20, 40]°C gets the extreme color.
pub fn temperature_color(celsius: i32) -> Rgb888 {
    let t = celsius.clamp(-20, 40);
    let t = (((t + 20) * 255) as f32 / 60.0).round_ties_even() as u8;
    Rgb888::new(t, 0, 255 - t)
}

/// Deserialize a value that's encoded as a JSON string
fn from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s = String::deserialize(deserializer)?;
    s.trim().parse().map_err(serde::de::Error::custom)
}
