use crate::{
    framebuffer::{Framebuffer, WIDTH},
    settings::{Settings, TemperatureUnit, WindFormat},
    weather::{temperature_color, Observation},
};
use anyhow::{anyhow, Context};
use embedded_graphics::{
    geometry::Point,
    image::Image,
    pixelcolor::{Rgb565, Rgb888, RgbColor},
    Drawable,
};
use log::{error, trace};
use std::{fs, path::PathBuf};
use tinybmp::Bmp;
use u8g2_fonts::{
    fonts,
    types::{FontColor, HorizontalAlignment, VerticalPosition},
    FontRenderer,
};

/// Draws the weather layout into an off-screen buffer. The buffer is kept
/// until the next draw, so it can be re-sent to the panel every tick.
pub struct Renderer {
    icon_dir: PathBuf,
    frame: Framebuffer,
}

impl Renderer {
    /// Shown on startup, before the first fetch completes
    pub const BOOT_ICON: &'static str = "1012";
    /// Gap between text and the right edge of the screen
    const MARGIN: i32 = 7;
    const LINE_HEIGHT: i32 = 56;
    const FONT: FontRenderer =
        FontRenderer::new::<fonts::u8g2_font_fub42_tf>();

    pub fn new(icon_dir: impl Into<PathBuf>) -> Self {
        Self {
            icon_dir: icon_dir.into(),
            frame: Framebuffer::new(),
        }
    }

    pub fn frame(&self) -> &Framebuffer {
        &self.frame
    }

    /// Clear the screen to white and draw the icon for a weather condition.
    /// Icons are 240x240, leaving room on the right for text. If the icon
    /// can't be loaded, the screen is left blank.
    pub fn show_icon(&mut self, condition_code: &str) {
        self.frame.fill(Rgb565::WHITE);
        if let Err(err) = self.draw_icon(condition_code) {
            error!("{err:?}");
        }
    }

    /// Draw a full observation: icon, then text on top. Fails if the font
    /// lacks a glyph for some of the text, leaving the frame half-drawn.
    pub fn show_observation(
        &mut self,
        observation: &Observation,
        settings: &Settings,
    ) -> anyhow::Result<()> {
        self.show_icon(&observation.condition_code);

        let x = WIDTH as i32 - Self::MARGIN;
        let mut y = 0;
        for line in lines(observation, settings) {
            trace!("Drawing {line:?} at y={y}");
            Self::FONT
                .render_aligned(
                    line.text.as_str(),
                    Point::new(x, y),
                    VerticalPosition::Top,
                    HorizontalAlignment::Right,
                    FontColor::Transparent(Rgb565::from(line.color)),
                    &mut self.frame,
                )
                .map_err(|err| anyhow!("Error drawing `{}`: {err:?}", line.text))?;
            y += Self::LINE_HEIGHT;
        }
        Ok(())
    }

    /// Paint the whole screen red, to show that the API gave us garbage
    pub fn show_invalid(&mut self) {
        self.frame.fill(Rgb565::RED);
    }

    fn draw_icon(&mut self, condition_code: &str) -> anyhow::Result<()> {
        let path = self.icon_dir.join(format!("{condition_code}.bmp"));
        let data = fs::read(&path).with_context(|| {
            format!("Error reading icon {}", path.display())
        })?;
        let bmp = Bmp::<Rgb565>::from_slice(&data).map_err(|err| {
            anyhow!("Error parsing icon {}: {err:?}", path.display())
        })?;
        Image::new(&bmp, Point::zero()).draw(&mut self.frame)?;
        Ok(())
    }
}

/// One line of text in the layout
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub color: Rgb888,
}

impl TextLine {
    const DARK_RED: Rgb888 = Rgb888::new(175, 0, 0);
    const DARK_GREEN: Rgb888 = Rgb888::new(0, 175, 0);
    const DARK_BLUE: Rgb888 = Rgb888::new(0, 0, 175);

    fn new(text: String, color: Rgb888) -> Self {
        Self { text, color }
    }
}

/// Text content of the layout, top to bottom: temperature, pressure,
/// humidity, wind
pub fn lines(observation: &Observation, settings: &Settings) -> [TextLine; 4] {
    let temperature = format!(
        "{}°{}",
        observation.temperature(settings.unit),
        settings.unit.symbol()
    );
    let direction = match settings.wind_format {
        WindFormat::Cardinal => observation.wind_direction.clone(),
        WindFormat::Degrees => format!("{}°", observation.wind_degree),
    };

    [
        // Color always follows Celsius, so the same weather looks the same
        // in both units
        TextLine::new(
            temperature,
            temperature_color(
                observation.temperature(TemperatureUnit::Celsius),
            ),
        ),
        TextLine::new(observation.pressure.clone(), TextLine::DARK_GREEN),
        TextLine::new(
            format!("{}%", observation.humidity),
            TextLine::DARK_BLUE,
        ),
        TextLine::new(
            format!("{direction} {}", observation.wind_force),
            TextLine::DARK_RED,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{framebuffer::HEIGHT, weather::tests::observation};
    use std::{env, path::Path};

    /// Write a 2x2 all-black 24-bit BMP
    fn write_icon(dir: &Path, name: &str) {
        let mut bmp = Vec::new();
        // File header
        bmp.extend(b"BM");
        bmp.extend(70u32.to_le_bytes());
        bmp.extend(0u32.to_le_bytes());
        bmp.extend(54u32.to_le_bytes());
        // Info header
        bmp.extend(40u32.to_le_bytes());
        bmp.extend(2i32.to_le_bytes());
        bmp.extend(2i32.to_le_bytes());
        bmp.extend(1u16.to_le_bytes());
        bmp.extend(24u16.to_le_bytes());
        bmp.extend(0u32.to_le_bytes());
        bmp.extend(16u32.to_le_bytes());
        bmp.extend(2835u32.to_le_bytes());
        bmp.extend(2835u32.to_le_bytes());
        bmp.extend(0u32.to_le_bytes());
        bmp.extend(0u32.to_le_bytes());
        // Two rows of 2 pixels, each padded to 4 bytes
        bmp.extend([0u8; 16]);
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(format!("{name}.bmp")), bmp).unwrap();
    }

    fn count_pixels(frame: &Framebuffer, f: impl Fn(Rgb565) -> bool) -> usize {
        (0..HEIGHT as i32)
            .flat_map(|y| (0..WIDTH as i32).map(move |x| Point::new(x, y)))
            .filter(|&point| f(frame.pixel(point)))
            .count()
    }

    #[test]
    fn test_lines_celsius() {
        let lines = lines(&observation(), &Settings::default());
        assert_eq!(
            lines,
            [
                TextLine::new("-1°C".into(), temperature_color(-1)),
                TextLine::new("1017".into(), TextLine::DARK_GREEN),
                TextLine::new("80%".into(), TextLine::DARK_BLUE),
                TextLine::new("SW 3-4".into(), TextLine::DARK_RED),
            ]
        );
    }

    #[test]
    fn test_lines_fahrenheit_degrees() {
        let settings = Settings {
            unit: TemperatureUnit::Fahrenheit,
            wind_format: WindFormat::Degrees,
            ..Default::default()
        };
        let [temperature, _, _, wind] = lines(&observation(), &settings);
        assert_eq!(temperature.text, "30°F");
        assert_eq!(temperature.color, temperature_color(-1));
        assert_eq!(wind.text, "240° 3-4");
    }

    #[test]
    fn test_show_icon() {
        let dir = env::temp_dir()
            .join(format!("hatmini-weather-icons-{}", std::process::id()));
        write_icon(&dir, "101");
        let mut renderer = Renderer::new(&dir);
        renderer.show_icon("101");
        let frame = renderer.frame();
        assert_eq!(frame.pixel(Point::new(0, 0)), Rgb565::BLACK);
        assert_eq!(frame.pixel(Point::new(1, 1)), Rgb565::BLACK);
        assert_eq!(frame.pixel(Point::new(2, 0)), Rgb565::WHITE);
        assert_eq!(count_pixels(frame, |color| color == Rgb565::BLACK), 4);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_icon_is_blank() {
        let mut renderer = Renderer::new("/nonexistent");
        renderer.show_invalid();
        renderer.show_icon("999");
        assert_eq!(
            count_pixels(renderer.frame(), |color| color != Rgb565::WHITE),
            0
        );
    }

    #[test]
    fn test_show_observation() {
        let mut renderer = Renderer::new("/nonexistent");
        renderer.show_observation(&observation(), &Settings::default()).unwrap();
        let frame = renderer.frame();
        // Some text got drawn, and none of it on the far left
        assert!(count_pixels(frame, |color| color != Rgb565::WHITE) > 0);
        for y in 0..HEIGHT as i32 {
            assert_eq!(frame.pixel(Point::new(0, y)), Rgb565::WHITE);
        }
    }

    #[test]
    fn test_show_observation_missing_glyph() {
        let mut renderer = Renderer::new("/nonexistent");
        let observation = Observation {
            wind_direction: "西南风".into(),
            ..observation()
        };
        let error = renderer
            .show_observation(&observation, &Settings::default())
            .unwrap_err();
        assert!(error.to_string().contains("西南风"));
    }

    #[test]
    fn test_show_invalid() {
        let mut renderer = Renderer::new("/nonexistent");
        renderer.show_invalid();
        assert_eq!(
            count_pixels(renderer.frame(), |color| color != Rgb565::RED),
            0
        );
    }
}
