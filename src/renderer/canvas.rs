//! CPU raster target
//!
//! `Canvas` is an `embedded-graphics` draw target, so primitives and mono
//! fonts render straight into the RGBA buffer. Everything is drawn with
//! source-over blending onto an opaque buffer, so the finished frame is
//! always fully opaque.

use std::convert::Infallible;

use bytemuck::{Pod, Zeroable};
use embedded_graphics::Pixel;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle, StyledDrawable};
use glam::Vec2;

/// 8-bit RGBA pixel, laid out exactly as encoders expect
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Add (or subtract) a per-channel offset, saturating
    pub fn shade(self, dr: i16, dg: i16, db: i16) -> Self {
        let ch = |c: u8, d: i16| (i16::from(c) + d).clamp(0, 255) as u8;
        Self::rgb(ch(self.r, dr), ch(self.g, dg), ch(self.b, db))
    }

    /// Scale brightness by `factor` in 0..=1
    pub fn dim(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        let ch = |c: u8| (f32::from(c) * f).round() as u8;
        Self::rgb(ch(self.r), ch(self.g), ch(self.b))
    }
}

impl From<Rgb888> for Rgba {
    fn from(c: Rgb888) -> Self {
        Self::rgb(c.r(), c.g(), c.b())
    }
}

impl From<Rgba> for Rgb888 {
    fn from(c: Rgba) -> Self {
        Rgb888::new(c.r, c.g, c.b)
    }
}

/// Alpha from a 0..=1 opacity
#[inline]
pub fn alpha(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Nearest pixel to a canvas-space position
#[inline]
pub fn to_point(p: Vec2) -> Point {
    Point::new(p.x.round() as i32, p.y.round() as i32)
}

pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    pub fn into_pixels(self) -> Vec<Rgba> {
        self.pixels
    }

    /// Blend one pixel; out-of-bounds writes are dropped
    pub fn blend(&mut self, x: i32, y: i32, color: Rgba, alpha: u8) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 || alpha == 0 {
            return;
        }
        let idx = (y as u32 * self.width + x as u32) as usize;
        let dst = &mut self.pixels[idx];
        if alpha == 255 {
            *dst = Rgba { a: 255, ..color };
            return;
        }
        let a = u16::from(alpha);
        let mix = |s: u8, d: u8| ((u16::from(s) * a + u16::from(d) * (255 - a) + 127) / 255) as u8;
        *dst = Rgba::rgb(mix(color.r, dst.r), mix(color.g, dst.g), mix(color.b, dst.b));
    }

    /// Draw target that blends everything at a fixed opacity
    pub fn translucent(&mut self, alpha: u8) -> Translucent<'_> {
        Translucent {
            canvas: self,
            alpha,
        }
    }

    /// Fill any primitive (rectangle, circle, triangle) at the given opacity
    pub fn fill_shape<S>(&mut self, shape: &S, color: Rgba, alpha: u8)
    where
        S: StyledDrawable<PrimitiveStyle<Rgb888>, Color = Rgb888, Output = ()>,
    {
        let style = PrimitiveStyle::with_fill(color.into());
        let Ok(()) = shape.draw_styled(&style, &mut self.translucent(alpha));
    }

    /// Filled rectangle with top-left corner `(x, y)`
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba, alpha: u8) {
        if w <= 0 || h <= 0 {
            return;
        }
        let rect = Rectangle::new(Point::new(x, y), Size::new(w as u32, h as u32));
        self.fill_shape(&rect, color, alpha);
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.blend(point.x, point.y, color.into(), 255);
        }
        Ok(())
    }
}

/// A `Canvas` view whose writes are blended at `alpha`
pub struct Translucent<'a> {
    canvas: &'a mut Canvas,
    alpha: u8,
}

impl OriginDimensions for Translucent<'_> {
    fn size(&self) -> Size {
        self.canvas.size()
    }
}

impl DrawTarget for Translucent<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.canvas.blend(point.x, point.y, color.into(), self.alpha);
        }
        Ok(())
    }
}
