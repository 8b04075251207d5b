// Core types shared by the surface, the stroke controller and the window.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A plain block of 32-bit pixels.
/// The drawing surface stores 0xAARRGGBB (alpha matters: erased pixels are 0).
/// The screen buffer handed to minifb stores 0x00RRGGBB.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,      // pixels
    pub height: usize,     // pixels
    pub pixels: Vec<u32>,  // length = width * height, row-major
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize, fill: u32) -> Self {
        Self { width, height, pixels: vec![fill; width * height] }
    }

    /// Pixel at (x, y), or None when outside the buffer.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, px: u32) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = px;
        }
    }
}

/// Straight (non-premultiplied) RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Pack as 0xAARRGGBB.
    #[inline]
    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    #[inline]
    pub const fn from_argb(px: u32) -> Self {
        Self {
            a: (px >> 24) as u8,
            r: (px >> 16) as u8,
            g: (px >> 8) as u8,
            b: px as u8,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color {0:?}: expected #rgb, #rrggbb, #rrggbbaa or a basic color name")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa` and a handful of names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseColorError(s.to_string());

        if let Some(hex) = s.strip_prefix('#') {
            if !hex.is_ascii() {
                return Err(err());
            }
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
            let nibble = |i: usize| {
                u8::from_str_radix(&hex[i..i + 1], 16)
                    .map(|n| n << 4 | n)
                    .map_err(|_| err())
            };
            return match hex.len() {
                3 => Ok(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
                6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
                8 => Ok(Color { r: byte(0)?, g: byte(2)?, b: byte(4)?, a: byte(6)? }),
                _ => Err(err()),
            };
        }

        match s.to_ascii_lowercase().as_str() {
            "white" => Ok(Color::WHITE),
            "black" => Ok(Color::BLACK),
            "red" => Ok(Color::rgb(255, 0, 0)),
            "green" => Ok(Color::rgb(0, 128, 0)),
            "blue" => Ok(Color::rgb(0, 0, 255)),
            _ => Err(err()),
        }
    }
}

/// Pointer position in surface pixels (fractional, like mouse coordinates).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in surface pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// A `size`×`size` square centered on `p`.
    pub fn centered(p: Point, size: f32) -> Self {
        let half = size / 2.0;
        Self::new(p.x - half, p.y - half, size, size)
    }

    /// Integer pixel span `[x0, x1) × [y0, y1)` clipped to `width`×`height`.
    /// A pixel belongs to the rect when its center lies inside it.
    pub fn pixel_span(&self, width: usize, height: usize) -> (usize, usize, usize, usize) {
        let clip = |v: f32, max: usize| v.round().clamp(0.0, max as f32) as usize;
        (
            clip(self.x, width),
            clip(self.y, height),
            clip(self.x + self.width, width),
            clip(self.y + self.height, height),
        )
    }
}
