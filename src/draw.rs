// Window + input + overlay drawing.
// Visual effects provided here:
// 1) A window that shows the avatar canvas.
// 2) Mouse state turned into pointer down/move/up/leave events.
// 3) Keys turned into tool-button actions.
// 4) A brush outline at the cursor and a small HUD (tool, size, color, swatches).

use crate::assets::Outfit;
use crate::controller::{DEFAULT_BRUSH_WIDTH, SWATCHES, StrokeController, Tool};
use crate::error::Error;
use crate::session::{PointerEvent, UiAction};
use crate::types::{Color, FrameBuffer, Point};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use rfd::FileDialog;
use std::path::{Path, PathBuf};

/// `[` / `]` change the brush width by this much.
const BRUSH_STEP: f32 = 1.0;

/// Formats the upload dialog offers; all of them decode with `image`.
const UPLOAD_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff", "tif", "tga", "ico"];

pub struct Drawer {
    window: Window,
    was_down: bool,              // left button state last frame
    last_pos: Option<Point>,     // None while the cursor is outside the window
}

impl Drawer {
    /// Create the window at the requested size.
    /// Visual: an empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window, was_down: false, last_pos: None })
    }

    /// Client area in pixels; this is the canvas container.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Cursor position inside the window, if it is inside.
    pub fn cursor(&self) -> Option<Point> {
        self.last_pos
    }

    /// Compare this frame's mouse state with the last one and emit pointer events.
    pub fn poll_pointer(&mut self) -> Vec<PointerEvent> {
        let pos = self
            .window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| Point::new(x, y));
        let down = self.window.get_mouse_down(MouseButton::Left);
        let events = pointer_transitions(self.last_pos, self.was_down, pos, down);
        self.last_pos = pos;
        self.was_down = down;
        events
    }

    /// Keys pressed this frame, as tool-button actions.
    /// `picker` is the color-picker value that P applies; `upload_preset` is where
    /// the upload dialog opens.
    pub fn poll_actions(&self, upload_preset: Option<&Path>, picker: Color) -> Vec<UiAction> {
        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let mut actions = Vec::new();

        if pressed(Key::B) { actions.push(UiAction::SelectTool(Tool::Brush)); }
        if pressed(Key::E) { actions.push(UiAction::SelectTool(Tool::Eraser)); }
        if pressed(Key::Key1) { actions.push(UiAction::Outfit(Outfit::Base)); }
        if pressed(Key::Key2) { actions.push(UiAction::Outfit(Outfit::AnimeGirl)); }
        if pressed(Key::Key3) { actions.push(UiAction::Outfit(Outfit::Shirt2)); }
        if pressed(Key::Key4) { actions.push(UiAction::Outfit(Outfit::Shirt3)); }
        if pressed(Key::C) { actions.push(UiAction::Clear); }
        if pressed(Key::Tab) { actions.push(UiAction::NextSwatch); }
        if pressed(Key::P) { actions.push(UiAction::SetColor(picker)); }
        if pressed(Key::Backspace) { actions.push(UiAction::CancelStroke); }
        if pressed(Key::S) { actions.push(UiAction::Export); }
        if pressed(Key::Key0) { actions.push(UiAction::SetBrushWidth(DEFAULT_BRUSH_WIDTH)); }

        // The size slider repeats while held.
        if self.window.is_key_pressed(Key::LeftBracket, KeyRepeat::Yes) {
            actions.push(UiAction::AdjustBrushWidth(-BRUSH_STEP));
        }
        if self.window.is_key_pressed(Key::RightBracket, KeyRepeat::Yes) {
            actions.push(UiAction::AdjustBrushWidth(BRUSH_STEP));
        }

        if pressed(Key::U) {
            match pick_upload(upload_preset) {
                Some(path) => actions.push(UiAction::Upload(path)),
                None => log::debug!("upload dialog cancelled"),
            }
        }
        actions
    }
}

/// Native open dialog for the upload button. Blocks the frame loop while open.
fn pick_upload(preset: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title("Upload image")
        .add_filter("Images", UPLOAD_EXTENSIONS);
    if let Some(path) = preset {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            dialog = dialog.set_directory(dir);
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            dialog = dialog.set_file_name(name);
        }
    }
    dialog.pick_file()
}

/// Pointer events implied by going from (`prev_pos`, `prev_down`) to (`pos`, `down`).
/// `pos` is None when the cursor is outside the window.
fn pointer_transitions(
    prev_pos: Option<Point>,
    prev_down: bool,
    pos: Option<Point>,
    down: bool,
) -> Vec<PointerEvent> {
    let mut events = Vec::new();
    match pos {
        None => {
            if prev_pos.is_some() {
                events.push(PointerEvent::Leave);
            }
        }
        Some(p) => {
            if prev_pos != Some(p) {
                events.push(PointerEvent::Move(p));
            }
            if down && !prev_down {
                events.push(PointerEvent::Down(p));
            } else if !down && prev_down {
                events.push(PointerEvent::Up);
            }
        }
    }
    events
}

/* ---------- Overlay drawing on the 0x00RRGGBB screen buffer ---------- */

#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    fb.set(x as usize, y as usize, color);
}

fn fill_box(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    for yy in y..y + h {
        for xx in x..x + w {
            put_pixel(fb, xx, yy, color);
        }
    }
}

fn outline_box(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    for xx in x..x + w {
        put_pixel(fb, xx, y, color);
        put_pixel(fb, xx, y + h - 1, color);
    }
    for yy in y..y + h {
        put_pixel(fb, x, yy, color);
        put_pixel(fb, x + w - 1, yy, color);
    }
}

/// Outline of what the next press will touch.
/// Visual: a circle of the brush width, or the eraser's square.
pub fn draw_tool_cursor(fb: &mut FrameBuffer, at: Point, tool: Tool, brush_width: f32, eraser_size: f32) {
    const INK: u32 = 0x00_80_80_80;
    let (cx, cy) = (at.x.round() as i32, at.y.round() as i32);
    match tool {
        Tool::Eraser => {
            let half = (eraser_size / 2.0).round() as i32;
            outline_box(fb, cx - half, cy - half, 2 * half, 2 * half, INK);
        }
        Tool::Brush => {
            let r = (brush_width / 2.0).max(1.0);
            // One dot per degree is plenty for radii up to 15 px.
            for step in 0..360 {
                let a = (step as f32).to_radians();
                put_pixel(fb, cx + (r * a.cos()).round() as i32, cy + (r * a.sin()).round() as i32, INK);
            }
        }
    }
}

/// Tool, size, color and the swatch strip in the top-left corner.
pub fn draw_hud(fb: &mut FrameBuffer, controller: &StrokeController, loading: bool) {
    let sel = controller.selection();
    let tool = match controller.indicator() {
        Tool::Brush => "BRUSH",
        Tool::Eraser => "ERASER",
    };
    let mut text = format!("{tool} | SIZE {} | {}", sel.brush_width.round() as i32, sel.color);
    if loading {
        text.push_str(" | LOADING");
    }
    draw_text_5x7(fb, 8, 8, &text, 0x00_30_30_30);

    // Swatches: the selected one gets a dark frame.
    for (i, c) in SWATCHES.iter().enumerate() {
        let x = 8 + i as i32 * 16;
        fill_box(fb, x + 1, 21, 10, 10, c.to_argb() & 0x00FF_FFFF);
        let frame = if *c == sel.color { 0x00_00_00_00 } else { 0x00_B0_B0_B0 };
        outline_box(fb, x, 20, 12, 12, frame);
    }
    // Current color (covers the picker case).
    fill_box(fb, 8 + 5 * 16 + 5, 21, 10, 10, sel.color.to_argb() & 0x00FF_FFFF);
    outline_box(fb, 8 + 5 * 16 + 4, 20, 12, 12, Color::BLACK.to_argb() & 0x00FF_FFFF);
}

/* ---------- 5x7 bitmap font ---------- */

/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'N' => g!(0b10001,0b11001,0b10101,0b10011,0b10001,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        '#' => g!(0b01010,0b01010,0b11111,0b01010,0b11111,0b01010,0b01010),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y), with a light shadow for contrast on dark outfits.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    let Some(rows) = glyph5x7(ch) else { return };
    for (offset, ink) in [(1, 0x00_FF_FF_FF), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx + offset, y + ry as i32 + offset, ink);
                }
            }
        }
    }
}

/// Draw a text string; each glyph is 5x7 with 1-pixel spacing.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6;
    }
}
