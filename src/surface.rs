//! The raster surface the user paints on, plus the fit-and-center math used to
//! place outfit images on it.
//!
//! The surface is always filled: construction and every resize paint the
//! background color, so a transparent buffer is never shown before the first
//! image or stroke lands.

use crate::gamma::GammaLut;
use crate::raster;
use crate::types::{Color, FrameBuffer, Point, Rect};
use image::{Rgb, RgbImage, RgbaImage};

/// Where an outfit image goes: a target box and the box's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub target_width: f32,
    pub target_height: f32,
    pub x_offset: f32,
    pub y_offset: f32,
}

impl Placement {
    pub const fn new(target_width: f32, target_height: f32, x_offset: f32, y_offset: f32) -> Self {
        Self { target_width, target_height, x_offset, y_offset }
    }
}

/// Aspect-preserving fit of a `width`×`height` image into `placement`, centered.
///
/// Landscape and square images are width-constrained, portrait images are
/// height-constrained. When that leaves the other axis larger than the box, the
/// size is scaled down to fit so the centering offsets never go negative.
pub fn fit_rect(width: u32, height: u32, placement: &Placement) -> Rect {
    let Placement { target_width: tw, target_height: th, x_offset, y_offset } = *placement;
    if width == 0 || height == 0 {
        return Rect::new(x_offset + tw / 2.0, y_offset + th / 2.0, 0.0, 0.0);
    }

    let aspect = width as f32 / height as f32;
    let (mut draw_w, mut draw_h) = if aspect >= 1.0 {
        (tw, tw / aspect)
    } else {
        (th * aspect, th)
    };

    if draw_w > tw {
        draw_w = tw;
        draw_h = tw / aspect;
    }
    if draw_h > th {
        draw_h = th;
        draw_w = th * aspect;
    }

    Rect::new(
        x_offset + (tw - draw_w) / 2.0,
        y_offset + (th - draw_h) / 2.0,
        draw_w,
        draw_h,
    )
}

pub struct Surface {
    frame: FrameBuffer,   // 0xAARRGGBB
    background: Color,    // current fill; also the backdrop for display/export
    smoothing: bool,      // false once an outfit has been placed
    lut: GammaLut,
}

impl Surface {
    /// A `width`×`height` surface already filled with `background`.
    pub fn new(width: usize, height: usize, background: Color) -> Self {
        Self {
            frame: FrameBuffer::new(width, height, background.to_argb()),
            background,
            smoothing: true,
            lut: GammaLut::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.frame.width
    }

    pub fn height(&self) -> usize {
        self.frame.height
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn smoothing(&self) -> bool {
        self.smoothing
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Match the container's size. The new buffer starts as plain background.
    pub fn resize_to_container(&mut self, width: usize, height: usize) {
        if width == self.frame.width && height == self.frame.height {
            return;
        }
        log::debug!("surface resized to {width}x{height}");
        self.frame = FrameBuffer::new(width, height, self.background.to_argb());
    }

    /// Overwrite everything with `color`, which becomes the current fill.
    pub fn fill_background(&mut self, color: Color) {
        self.background = color;
        raster::fill(&mut self.frame, color);
    }

    pub fn clear_rect(&mut self, rect: Rect) {
        raster::clear_rect(&mut self.frame, rect);
    }

    pub fn stroke_segment(&mut self, from: Point, to: Point, color: Color, width: f32) {
        raster::stroke_segment(&mut self.frame, from, to, color, width, &self.lut);
    }

    pub fn stroke_polyline(&mut self, points: &[Point], color: Color, width: f32) {
        raster::stroke_polyline(&mut self.frame, points, color, width, &self.lut);
    }

    /// Wipe the surface to transparent and draw `image` fitted into `placement`.
    /// Returns the rectangle the image landed in.
    pub fn place_image(&mut self, image: &RgbaImage, placement: &Placement) -> Rect {
        let (w, h) = image.dimensions();
        let dest = fit_rect(w, h, placement);
        self.smoothing = false;
        raster::fill(&mut self.frame, Color::TRANSPARENT);
        raster::blit_scaled(&mut self.frame, image, dest, self.smoothing, &self.lut);
        dest
    }

    /// Wipe the surface and stretch `image` over all of it (uploads).
    /// Smoothed only until the first outfit switched smoothing off.
    pub fn fill_with_image(&mut self, image: &RgbaImage) {
        let dest = Rect::new(0.0, 0.0, self.frame.width as f32, self.frame.height as f32);
        raster::fill(&mut self.frame, Color::TRANSPARENT);
        raster::blit_scaled(&mut self.frame, image, dest, self.smoothing, &self.lut);
    }

    pub fn snapshot(&self) -> FrameBuffer {
        self.frame.clone()
    }

    /// Put a snapshot back. Ignored when the surface was resized since.
    pub fn restore(&mut self, snapshot: &FrameBuffer) {
        if snapshot.width == self.frame.width && snapshot.height == self.frame.height {
            self.frame.pixels.copy_from_slice(&snapshot.pixels);
        }
    }

    /// Composite over the background into a 0x00RRGGBB screen buffer.
    pub fn flatten_into(&self, screen: &mut FrameBuffer) {
        raster::flatten_over(&self.frame, self.background, screen, &self.lut);
    }

    /// Flattened RGB copy for encoding.
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut flat = FrameBuffer::new(self.frame.width, self.frame.height, 0);
        self.flatten_into(&mut flat);
        RgbImage::from_fn(flat.width as u32, flat.height as u32, |x, y| {
            let px = flat.pixels[y as usize * flat.width + x as usize];
            Rgb([(px >> 16) as u8, (px >> 8) as u8, px as u8])
        })
    }
}
