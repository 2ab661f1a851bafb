use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::{
        raw::{RawData, RawU16},
        Rgb565,
    },
    Pixel,
};
use std::convert::Infallible;

/// Panel dimensions, landscape
pub const WIDTH: u32 = 320;
pub const HEIGHT: u32 = 240;

/// RGB565 off-screen buffer. All drawing happens here, then the whole thing
/// gets shipped to the panel in one go.
#[derive(Clone, Debug, PartialEq)]
pub struct Framebuffer {
    pixels: Vec<u16>,
}

impl Framebuffer {
    pub fn new() -> Self {
        Self {
            pixels: vec![0; (WIDTH * HEIGHT) as usize],
        }
    }

    pub fn fill(&mut self, color: Rgb565) {
        self.pixels.fill(RawU16::from(color).into_inner());
    }

    /// Get the color at a point. Panics if the point is out of bounds
    #[cfg(test)]
    pub fn pixel(&self, point: Point) -> Rgb565 {
        RawU16::new(self.pixels[Self::index(point)]).into()
    }

    /// Every pixel, row by row from the top left
    pub fn colors(&self) -> impl Iterator<Item = Rgb565> + '_ {
        self.pixels.iter().map(|&pixel| RawU16::new(pixel).into())
    }

    fn index(point: Point) -> usize {
        point.y as usize * WIDTH as usize + point.x as usize
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH, HEIGHT)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            // Off-screen pixels are expected (e.g. text hanging off an edge)
            // and get dropped
            if (0..WIDTH as i32).contains(&point.x)
                && (0..HEIGHT as i32).contains(&point.y)
            {
                self.pixels[Self::index(point)] =
                    RawU16::from(color).into_inner();
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::{
        pixelcolor::RgbColor,
        prelude::Primitive,
        primitives::{PrimitiveStyle, Rectangle},
        Drawable,
    };

    #[test]
    fn test_draw_clips() {
        let mut frame = Framebuffer::new();
        Rectangle::new(Point::new(310, 230), Size::new(20, 20))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::RED))
            .draw(&mut frame)
            .unwrap();
        assert_eq!(frame.pixel(Point::new(319, 239)), Rgb565::RED);
        assert_eq!(frame.pixel(Point::new(309, 239)), Rgb565::BLACK);
    }

    #[test]
    fn test_colors() {
        let mut frame = Framebuffer::new();
        frame.fill(Rgb565::WHITE);
        frame
            .draw_iter([
                Pixel(Point::new(1, 0), Rgb565::RED),
                Pixel(Point::new(0, 1), Rgb565::BLUE),
            ])
            .unwrap();

        let colors: Vec<Rgb565> = frame.colors().collect();
        assert_eq!(colors.len(), (WIDTH * HEIGHT) as usize);
        assert_eq!(&colors[..2], &[Rgb565::WHITE, Rgb565::RED]);
        assert_eq!(colors[WIDTH as usize], Rgb565::BLUE);
    }
}
