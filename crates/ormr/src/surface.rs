//! The drawing boundary between the engine and its host renderer.
//!
//! The engine never owns a canvas. Hosts hand it a [`Surface`] for the draw
//! phase and keep the actual backing (a window, a framebuffer, a terminal, a
//! test recorder) to themselves.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::assets::Image;
use crate::math::Rect;

/// An RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a `#rrggbb` string, the background-color format most hosts
    /// already have on hand. Returns `None` for anything else.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .ok()
                .map(|v| f32::from(v) / 255.0)
        };
        Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Per-blit options for [`Surface::draw_image`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawOptions {
    pub hflip: bool,
    pub vflip: bool,
}

/// Default text styling. Override individual fields with struct-update
/// syntax: `TextStyle { fill: Color::WHITE, ..TextStyle::default() }`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// CSS-style font description, passed through to the host.
    pub font: String,
    pub fill: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: "10px Arial".to_string(),
            fill: Color::BLACK,
        }
    }
}

/// Default rectangle styling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectStyle {
    pub fill: Color,
}

impl Default for RectStyle {
    fn default() -> Self {
        Self { fill: Color::BLACK }
    }
}

/// What the engine needs from a drawing surface. All coordinates are logical
/// screen pixels; display scaling is the host's business.
pub trait Surface {
    /// Fill the whole surface with one color.
    fn clear(&mut self, color: Color);

    /// Blit the `src` region of `image` (in image pixels) to the `dest`
    /// region of the surface (in screen pixels), stretching if the sizes
    /// differ. Style state must be restored before returning.
    fn draw_image(&mut self, image: &Image, src: Rect, dest: Rect, options: DrawOptions);

    fn fill_rect(&mut self, rect: Rect, style: &RectStyle);

    fn fill_text(&mut self, text: &str, pos: Vec2, style: &TextStyle);
}

/// A surface that discards everything. Useful for headless runs where only
/// the process phase matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn clear(&mut self, _color: Color) {}

    fn draw_image(&mut self, _image: &Image, _src: Rect, _dest: Rect, _options: DrawOptions) {}

    fn fill_rect(&mut self, _rect: Rect, _style: &RectStyle) {}

    fn fill_text(&mut self, _text: &str, _pos: Vec2, _style: &TextStyle) {}
}
