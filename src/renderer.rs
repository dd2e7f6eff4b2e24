use std::convert::Infallible;
use std::fmt::Debug;
use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    mono_font::{iso_8859_1::{FONT_7X13, FONT_7X14, FONT_9X15_BOLD}, MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle},
    text::{Baseline, Text},
    Pixel,
};
use image::{GrayImage, Luma};
use log::warn;
use crate::config::{Border, DisplayConfig};
use crate::errors::RenderError;
use crate::layout::{DrawInstruction, Layout, Slot, TextStyle};

/// Ink is BinaryColor::On, paper is BinaryColor::Off
const INK_THRESHOLD: u8 = 128;

/// Bi-level framebuffer in display orientation
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<BinaryColor>,
}

impl Framebuffer {
    /// Returns a blank (all paper) framebuffer
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, pixels: vec![BinaryColor::Off; (width * height) as usize] }
    }

    /// Returns a framebuffer pre-filled with a background picture, dark pixels become ink.
    /// The picture is clipped to the framebuffer size.
    ///
    /// # Arguments
    ///
    /// * 'path' - path to the background picture
    /// * 'width' - framebuffer width
    /// * 'height' - framebuffer height
    pub fn with_background(path: &str, width: u32, height: u32) -> Result<Self, RenderError> {
        let picture = image::open(path)?.to_luma8();
        let mut fb = Framebuffer::new(width, height);

        for (x, y, pixel) in picture.enumerate_pixels() {
            if x < width && y < height && pixel.0[0] < INK_THRESHOLD {
                fb.pixels[(y * width + x) as usize] = BinaryColor::On;
            }
        }

        Ok(fb)
    }

    pub fn pixel(&self, x: u32, y: u32) -> BinaryColor {
        self.pixels[(y * self.width + x) as usize]
    }

    #[cfg(test)]
    pub fn ink_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_on()).count()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 && (point.x as u32) < self.width && (point.y as u32) < self.height {
                self.pixels[(point.y as u32 * self.width + point.x as u32) as usize] = color;
            }
        }
        Ok(())
    }
}

fn font_for(style: TextStyle) -> &'static MonoFont<'static> {
    match style {
        TextStyle::Data => &FONT_9X15_BOLD,
        TextStyle::Label => &FONT_7X14,
        TextStyle::Annotation => &FONT_7X13,
    }
}

/// Paints the layout's separator rules and all draw instructions onto the target.
///
/// A failing transit row is logged and skipped, any other failure aborts the render.
///
/// # Arguments
///
/// * 'target' - where to paint
/// * 'layout' - the layout the instructions were composed for
/// * 'instructions' - positioned texts from the layout composer
pub fn render<D>(target: &mut D, layout: &Layout, instructions: &[DrawInstruction]) -> Result<(), RenderError>
where
    D: DrawTarget<Color = BinaryColor>,
    D::Error: Debug,
{
    let stroke = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
    for rule in &layout.rules {
        Line::new(Point::new(rule.from.0, rule.from.1), Point::new(rule.to.0, rule.to.1))
            .into_styled(stroke)
            .draw(target)
            .map_err(|e| RenderError::Draw(format!("rule {:?}: {:?}", rule, e)))?;
    }

    for instruction in instructions {
        let style = MonoTextStyle::new(font_for(instruction.style), BinaryColor::On);
        let position = Point::new(instruction.position.0, instruction.position.1);
        let result = Text::with_baseline(&instruction.text, position, style, Baseline::Top).draw(target);

        if let Err(e) = result {
            match instruction.slot {
                Slot::TransitRow(row) => {
                    warn!("failure on display text for train row {}: {:?}", row, e);
                },
                _ => return Err(RenderError::Draw(format!("{:?} {:?}: {:?}", instruction.slot, instruction.text, e))),
            }
        }
    }

    Ok(())
}

/// The flush to the physical medium, applying static orientation and border settings
pub trait Panel {
    fn show(&mut self, frame: &Framebuffer) -> Result<(), RenderError>;
}

/// Panel writing each frame to an image file
pub struct ImagePanel {
    output_path: String,
    h_flip: bool,
    v_flip: bool,
    border: Border,
}

impl ImagePanel {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            output_path: config.output_path.clone(),
            h_flip: config.h_flip,
            v_flip: config.v_flip,
            border: config.border,
        }
    }

    /// Returns the frame as a grayscale image in panel orientation
    ///
    /// # Arguments
    ///
    /// * 'frame' - the framebuffer to convert
    fn to_image(&self, frame: &Framebuffer) -> GrayImage {
        let (w, h) = (frame.width, frame.height);
        let mut img = GrayImage::new(w, h);

        for y in 0..h {
            for x in 0..w {
                let px = if self.h_flip { w - 1 - x } else { x };
                let py = if self.v_flip { h - 1 - y } else { y };
                let edge = x == 0 || y == 0 || x == w - 1 || y == h - 1;
                let ink = frame.pixel(x, y).is_on() || (edge && self.border == Border::Black);
                img.put_pixel(px, py, Luma([if ink { 0 } else { 255 }]));
            }
        }

        img
    }
}

impl Panel for ImagePanel {
    fn show(&mut self, frame: &Framebuffer) -> Result<(), RenderError> {
        self.to_image(frame).save(&self.output_path)?;

        Ok(())
    }
}
