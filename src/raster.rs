// Software rasterizer for the avatar surface.
// Everything here writes 0xAARRGGBB pixels into a FrameBuffer:
// solid fills, rectangular clears, round-capped line segments and
// nearest-neighbour or bilinear image blits. Edges are blended in linear light.
use crate::gamma::GammaLut;
use crate::types::{Color, FrameBuffer, Point, Rect};
use image::RgbaImage;

/// Overwrite every pixel.
pub fn fill(fb: &mut FrameBuffer, color: Color) {
    let px = color.to_argb();
    for p in &mut fb.pixels {
        *p = px;
    }
}

/// Set every pixel whose center lies in `rect` to transparent.
/// Visual: the white backdrop shows through where the eraser went.
pub fn clear_rect(fb: &mut FrameBuffer, rect: Rect) {
    let (x0, y0, x1, y1) = rect.pixel_span(fb.width, fb.height);
    if x1 <= x0 {
        return;
    }
    for y in y0..y1 {
        let row = y * fb.width;
        for p in &mut fb.pixels[row + x0..row + x1] {
            *p = 0;
        }
    }
}

/// Source-over of `src` (scaled by `coverage`) onto one 0xAARRGGBB pixel.
#[inline]
fn blend_over(dst: u32, src: Color, coverage: f32, lut: &GammaLut) -> u32 {
    let sa = (src.a as f32 / 255.0) * coverage;
    if sa <= 0.0 {
        return dst;
    }
    if sa >= 1.0 {
        return src.to_argb();
    }

    let d = Color::from_argb(dst);
    let da = d.a as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return 0;
    }

    // Straight-alpha source-over, channel by channel in linear light.
    let channel = |s: u8, d: u8| {
        let l = (lut.linear(s) * sa + lut.linear(d) * da * (1.0 - sa)) / out_a;
        lut.srgb(l)
    };
    Color {
        r: channel(src.r, d.r),
        g: channel(src.g, d.g),
        b: channel(src.b, d.b),
        a: (out_a * 255.0).round() as u8,
    }
    .to_argb()
}

/// Distance from `p` to the segment `a`–`b`.
#[inline]
fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let len2 = abx * abx + aby * aby;
    let t = if len2 > 0.0 {
        (((p.x - a.x) * abx + (p.y - a.y) * aby) / len2).clamp(0.0, 1.0)
    } else {
        0.0 // zero-length segment: round caps make it a dot
    };
    let (cx, cy) = (a.x + abx * t, a.y + aby * t);
    ((p.x - cx) * (p.x - cx) + (p.y - cy) * (p.y - cy)).sqrt()
}

/// Stroke one straight segment with round caps.
/// Every pixel whose center is within `width / 2` of the segment gets the color;
/// a one-pixel band around that is blended by coverage.
pub fn stroke_segment(
    fb: &mut FrameBuffer,
    from: Point,
    to: Point,
    color: Color,
    width: f32,
    lut: &GammaLut,
) {
    let r = (width / 2.0).max(0.5);
    let pad = r + 1.0;

    // Scan only the segment's bounding box, clipped to the buffer.
    let x0 = (from.x.min(to.x) - pad).floor().max(0.0) as usize;
    let y0 = (from.y.min(to.y) - pad).floor().max(0.0) as usize;
    let x1 = ((from.x.max(to.x) + pad).ceil().max(0.0) as usize).min(fb.width);
    let y1 = ((from.y.max(to.y) + pad).ceil().max(0.0) as usize).min(fb.height);

    for y in y0..y1 {
        for x in x0..x1 {
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            let d = distance_to_segment(center, from, to);
            let coverage = (r + 0.5 - d).clamp(0.0, 1.0);
            if coverage <= 0.0 {
                continue;
            }
            let idx = y * fb.width + x;
            fb.pixels[idx] = blend_over(fb.pixels[idx], color, coverage, lut);
        }
    }
}

/// Stroke consecutive segments through `points` (a single point becomes a dot).
pub fn stroke_polyline(fb: &mut FrameBuffer, points: &[Point], color: Color, width: f32, lut: &GammaLut) {
    match points {
        [] => {}
        [p] => stroke_segment(fb, *p, *p, color, width, lut),
        _ => {
            for pair in points.windows(2) {
                stroke_segment(fb, pair[0], pair[1], color, width, lut);
            }
        }
    }
}

/// Draw `image` scaled into `dest`.
/// With `smooth` off every pixel takes its nearest texel; pixel-art outfits keep
/// hard edges at any scale. With it on, texels are blended bilinearly.
pub fn blit_scaled(fb: &mut FrameBuffer, image: &RgbaImage, dest: Rect, smooth: bool, lut: &GammaLut) {
    let (iw, ih) = image.dimensions();
    if iw == 0 || ih == 0 || dest.width <= 0.0 || dest.height <= 0.0 {
        return;
    }
    let (x0, y0, x1, y1) = dest.pixel_span(fb.width, fb.height);
    let sx = iw as f32 / dest.width;
    let sy = ih as f32 / dest.height;

    for y in y0..y1 {
        let v = (y as f32 + 0.5 - dest.y) * sy;
        for x in x0..x1 {
            let u = (x as f32 + 0.5 - dest.x) * sx;
            let src = if smooth {
                sample_bilinear(image, u - 0.5, v - 0.5, lut)
            } else {
                let [r, g, b, a] = image.get_pixel((u as u32).min(iw - 1), (v as u32).min(ih - 1)).0;
                Color { r, g, b, a }
            };
            let idx = y * fb.width + x;
            fb.pixels[idx] = blend_over(fb.pixels[idx], src, 1.0, lut);
        }
    }
}

/// Bilinear texel lookup at texel-space (`u`, `v`), edges clamped.
/// Color is averaged in linear light, weighted by alpha.
fn sample_bilinear(image: &RgbaImage, u: f32, v: f32, lut: &GammaLut) -> Color {
    let (iw, ih) = image.dimensions();
    let u = u.clamp(0.0, (iw - 1) as f32);
    let v = v.clamp(0.0, (ih - 1) as f32);
    let (u0, v0) = (u.floor() as u32, v.floor() as u32);
    let (u1, v1) = ((u0 + 1).min(iw - 1), (v0 + 1).min(ih - 1));
    let (fu, fv) = (u - u0 as f32, v - v0 as f32);

    let mut acc = [0.0f32; 4]; // premultiplied linear r, g, b and alpha
    for (tx, ty, w) in [
        (u0, v0, (1.0 - fu) * (1.0 - fv)),
        (u1, v0, fu * (1.0 - fv)),
        (u0, v1, (1.0 - fu) * fv),
        (u1, v1, fu * fv),
    ] {
        let [r, g, b, a] = image.get_pixel(tx, ty).0;
        let wa = w * a as f32 / 255.0;
        acc[0] += lut.linear(r) * wa;
        acc[1] += lut.linear(g) * wa;
        acc[2] += lut.linear(b) * wa;
        acc[3] += wa;
    }
    if acc[3] <= 0.0 {
        return Color::TRANSPARENT;
    }
    Color {
        r: lut.srgb(acc[0] / acc[3]),
        g: lut.srgb(acc[1] / acc[3]),
        b: lut.srgb(acc[2] / acc[3]),
        a: (acc[3] * 255.0).round() as u8,
    }
}

/// Composite an ARGB surface over an opaque backdrop into a 0x00RRGGBB buffer.
/// Visual: what the window shows and what the JPEG export contains.
pub fn flatten_over(src: &FrameBuffer, backdrop: Color, dst: &mut FrameBuffer, lut: &GammaLut) {
    if dst.width != src.width || dst.height != src.height {
        *dst = FrameBuffer::new(src.width, src.height, 0);
    }
    let back = Color { a: 255, ..backdrop };
    for (out, &px) in dst.pixels.iter_mut().zip(&src.pixels) {
        let a = px >> 24;
        *out = match a {
            255 => px & 0x00FF_FFFF,
            0 => back.to_argb() & 0x00FF_FFFF,
            _ => {
                let c = Color::from_argb(px);
                let t = a as f32 / 255.0;
                Color::rgb(lut.mix(back.r, c.r, t), lut.mix(back.g, c.g, t), lut.mix(back.b, c.b, t))
                    .to_argb()
                    & 0x00FF_FFFF
            }
        };
    }
}
