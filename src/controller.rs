//! Stroke Interaction Controller.
//!
//! Turns pointer events into raster mutations. Two states, `Idle` and
//! `Drawing`; only pointer-down enters `Drawing`, so move events without a
//! prior press do nothing.
//!
//! Two variants exist:
//! - [`StrokeVariant::Direct`] draws one segment per move and erases with a
//!   fixed square clear.
//! - [`StrokeVariant::Snapshot`] copies the surface when the stroke starts,
//!   restores it on every move and redraws the stroke's polyline, giving a live
//!   preview. Its eraser paints the background color at brush width, and the
//!   copy lets an unfinished stroke be cancelled.

use crate::surface::Surface;
use crate::types::{Color, FrameBuffer, Point, Rect};

/// Side of the square the eraser clears, centered on the pointer.
pub const ERASER_SIZE: f32 = 20.0;
pub const MIN_BRUSH_WIDTH: f32 = 1.0;
pub const MAX_BRUSH_WIDTH: f32 = 30.0;
pub const DEFAULT_BRUSH_WIDTH: f32 = 5.0;

/// Color swatches offered next to the picker.
pub const SWATCHES: [Color; 5] = [
    Color::WHITE,
    Color::BLACK,
    Color::rgb(0xE0, 0x20, 0x20),
    Color::rgb(0x6D, 0xD4, 0x00),
    Color::rgb(0x4A, 0x98, 0xF7),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Brush,
    Eraser,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StrokeVariant {
    #[default]
    Direct,
    Snapshot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeState {
    Idle,
    Drawing,
}

/// What the UI controls have selected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToolSelection {
    pub tool: Tool,
    pub brush_width: f32,
    pub color: Color,
}

impl Default for ToolSelection {
    fn default() -> Self {
        Self { tool: Tool::Brush, brush_width: DEFAULT_BRUSH_WIDTH, color: Color::BLACK }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PointerState {
    pub is_drawing: bool,
    pub last: Point,
}

pub struct StrokeController {
    pointer: PointerState,
    selection: ToolSelection,
    variant: StrokeVariant,
    indicator: Tool,                  // which tool button shows as active
    snapshot: Option<FrameBuffer>,    // Snapshot variant: surface at stroke start
    points: Vec<Point>,               // Snapshot variant: the stroke so far
}

impl StrokeController {
    pub fn new(selection: ToolSelection, variant: StrokeVariant) -> Self {
        let selection = ToolSelection {
            brush_width: selection.brush_width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH),
            ..selection
        };
        Self {
            pointer: PointerState::default(),
            selection,
            variant,
            indicator: selection.tool,
            snapshot: None,
            points: Vec::new(),
        }
    }

    pub fn state(&self) -> StrokeState {
        if self.pointer.is_drawing { StrokeState::Drawing } else { StrokeState::Idle }
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn selection(&self) -> ToolSelection {
        self.selection
    }

    pub fn variant(&self) -> StrokeVariant {
        self.variant
    }

    pub fn indicator(&self) -> Tool {
        self.indicator
    }

    pub fn select_tool(&mut self, tool: Tool) {
        self.selection.tool = tool;
        self.indicator = tool;
    }

    pub fn set_color(&mut self, color: Color) {
        self.selection.color = color;
    }

    pub fn set_brush_width(&mut self, width: f32) {
        self.selection.brush_width = width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH);
    }

    /// Move to the swatch after the current color (first swatch if the color is custom).
    pub fn next_swatch(&mut self) {
        let next = SWATCHES
            .iter()
            .position(|&c| c == self.selection.color)
            .map_or(0, |i| (i + 1) % SWATCHES.len());
        self.selection.color = SWATCHES[next];
    }

    /// Idle -> Drawing.
    pub fn pointer_down(&mut self, surface: &mut Surface, p: Point) {
        self.pointer = PointerState { is_drawing: true, last: p };

        if self.variant == StrokeVariant::Snapshot {
            self.snapshot = Some(surface.snapshot());
            self.points.clear();
            self.points.push(p);
        }

        match self.selection.tool {
            // Instant feedback even if the pointer never moves.
            Tool::Eraser => self.erase_at(surface, p),
            Tool::Brush => {
                self.indicator = Tool::Brush;
                if self.variant == StrokeVariant::Snapshot {
                    self.redraw_preview(surface);
                }
            }
        }
    }

    /// While Drawing: extend the stroke or keep erasing. Ignored when Idle.
    pub fn pointer_move(&mut self, surface: &mut Surface, p: Point) {
        if !self.pointer.is_drawing {
            return;
        }

        match (self.variant, self.selection.tool) {
            (StrokeVariant::Direct, Tool::Eraser) => self.erase_at(surface, p),
            (StrokeVariant::Direct, Tool::Brush) => {
                let ToolSelection { color, brush_width, .. } = self.selection;
                surface.stroke_segment(self.pointer.last, p, color, brush_width);
            }
            (StrokeVariant::Snapshot, _) => {
                self.points.push(p);
                self.redraw_preview(surface);
            }
        }
        self.pointer.last = p;
    }

    /// Drawing -> Idle. The surface is left as it is.
    pub fn pointer_up(&mut self) {
        self.finish();
    }

    /// Same as release: leaving the surface ends the stroke.
    pub fn pointer_leave(&mut self) {
        self.finish();
    }

    /// Snapshot variant only: drop the unfinished stroke and restore the surface.
    /// Returns false when there was nothing to cancel.
    pub fn cancel_stroke(&mut self, surface: &mut Surface) -> bool {
        if !self.pointer.is_drawing {
            return false;
        }
        match self.snapshot.take() {
            Some(snap) => {
                surface.restore(&snap);
                self.points.clear();
                self.pointer.is_drawing = false;
                true
            }
            None => false,
        }
    }

    /// The surface content was replaced underneath an ongoing stroke (outfit
    /// swap, upload, clear). A snapshot stroke restarts from the new content at
    /// the last pointer position; restoring the old snapshot would undo the swap.
    pub fn rebase(&mut self, surface: &Surface) {
        if !self.pointer.is_drawing || self.snapshot.is_none() {
            return;
        }
        self.snapshot = Some(surface.snapshot());
        self.points.clear();
        self.points.push(self.pointer.last);
    }

    fn finish(&mut self) {
        self.pointer.is_drawing = false;
        self.snapshot = None;
        self.points.clear();
    }

    fn erase_at(&self, surface: &mut Surface, p: Point) {
        match self.variant {
            StrokeVariant::Direct => surface.clear_rect(Rect::centered(p, ERASER_SIZE)),
            StrokeVariant::Snapshot => self.redraw_preview(surface),
        }
    }

    fn redraw_preview(&self, surface: &mut Surface) {
        if let Some(snap) = &self.snapshot {
            surface.restore(snap);
        }
        let color = match self.selection.tool {
            Tool::Brush => self.selection.color,
            Tool::Eraser => surface.background(),
        };
        surface.stroke_polyline(&self.points, color, self.selection.brush_width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);

    fn white() -> Surface {
        Surface::new(200, 200, Color::WHITE)
    }

    fn brush(color: Color) -> ToolSelection {
        ToolSelection { tool: Tool::Brush, brush_width: 5.0, color }
    }

    fn changed_pixels(a: &FrameBuffer, b: &FrameBuffer) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for y in 0..a.height {
            for x in 0..a.width {
                if a.get(x, y) != b.get(x, y) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn brush_down_then_move_draws_one_segment() {
        let mut s = white();
        let mut c = StrokeController::new(brush(RED), StrokeVariant::Direct);

        c.pointer_down(&mut s, Point::new(100.0, 100.0));
        assert_eq!(c.state(), StrokeState::Drawing);
        // A press alone does not paint with the brush.
        assert!(s.frame().pixels.iter().all(|&p| p == Color::WHITE.to_argb()));

        c.pointer_move(&mut s, Point::new(120.0, 100.0));
        assert_eq!(c.pointer().last, Point::new(120.0, 100.0));

        let mut expected = white();
        expected.stroke_segment(Point::new(100.0, 100.0), Point::new(120.0, 100.0), RED, 5.0);
        assert_eq!(s.frame(), expected.frame());
    }

    #[test]
    fn eraser_clears_immediately_on_press() {
        let mut s = white();
        let mut c = StrokeController::new(brush(RED), StrokeVariant::Direct);
        c.select_tool(Tool::Eraser);

        let before = s.snapshot();
        c.pointer_down(&mut s, Point::new(50.0, 50.0));

        let changed = changed_pixels(&before, s.frame());
        assert_eq!(changed.len(), 20 * 20);
        assert!(changed.iter().all(|&(x, y)| (40..60).contains(&x) && (40..60).contains(&y)));
        assert_eq!(s.frame().get(40, 40), Some(0));
        assert_eq!(s.frame().get(59, 59), Some(0));
    }

    #[test]
    fn eraser_keeps_clearing_while_moving() {
        let mut s = white();
        let mut c = StrokeController::new(brush(RED), StrokeVariant::Direct);
        c.select_tool(Tool::Eraser);
        c.pointer_down(&mut s, Point::new(50.0, 50.0));
        c.pointer_move(&mut s, Point::new(150.0, 150.0));
        assert_eq!(s.frame().get(150, 150), Some(0));
        // The space between the two positions is not swept.
        assert_eq!(s.frame().get(100, 100), Some(Color::WHITE.to_argb()));
    }

    #[test]
    fn move_without_press_is_ignored() {
        let mut s = white();
        let mut c = StrokeController::new(brush(RED), StrokeVariant::Direct);
        c.pointer_move(&mut s, Point::new(10.0, 10.0));
        c.pointer_move(&mut s, Point::new(90.0, 90.0));
        assert_eq!(c.state(), StrokeState::Idle);
        assert!(s.frame().pixels.iter().all(|&p| p == Color::WHITE.to_argb()));
    }

    #[test]
    fn release_and_leave_end_the_stroke() {
        let mut s = white();
        let mut c = StrokeController::new(brush(RED), StrokeVariant::Direct);

        c.pointer_down(&mut s, Point::new(10.0, 10.0));
        c.pointer_up();
        assert_eq!(c.state(), StrokeState::Idle);
        let after_up = s.snapshot();
        c.pointer_move(&mut s, Point::new(80.0, 10.0));
        assert_eq!(s.frame(), &after_up);

        c.pointer_down(&mut s, Point::new(10.0, 50.0));
        c.pointer_leave();
        assert_eq!(c.state(), StrokeState::Idle);
    }

    #[test]
    fn brush_press_lights_brush_indicator() {
        let mut s = white();
        let mut c = StrokeController::new(brush(RED), StrokeVariant::Direct);
        c.select_tool(Tool::Eraser);
        assert_eq!(c.indicator(), Tool::Eraser);
        c.select_tool(Tool::Brush);
        c.pointer_down(&mut s, Point::new(1.0, 1.0));
        assert_eq!(c.indicator(), Tool::Brush);
    }

    #[test]
    fn width_is_clamped_and_swatches_cycle() {
        let mut c = StrokeController::new(brush(Color::BLACK), StrokeVariant::Direct);
        c.set_brush_width(100.0);
        assert_eq!(c.selection().brush_width, MAX_BRUSH_WIDTH);
        c.set_brush_width(0.0);
        assert_eq!(c.selection().brush_width, MIN_BRUSH_WIDTH);

        c.next_swatch();
        assert_eq!(c.selection().color, SWATCHES[2]);
        c.set_color(Color::rgb(1, 2, 3));
        c.next_swatch();
        assert_eq!(c.selection().color, SWATCHES[0]);
    }

    #[test]
    fn snapshot_variant_previews_whole_stroke() {
        let mut s = white();
        let mut c = StrokeController::new(brush(RED), StrokeVariant::Snapshot);
        c.pointer_down(&mut s, Point::new(20.0, 20.0));
        c.pointer_move(&mut s, Point::new(60.0, 20.0));
        c.pointer_move(&mut s, Point::new(60.0, 60.0));
        c.pointer_up();

        let mut expected = white();
        expected.stroke_polyline(
            &[Point::new(20.0, 20.0), Point::new(60.0, 20.0), Point::new(60.0, 60.0)],
            RED,
            5.0,
        );
        assert_eq!(s.frame(), expected.frame());
    }

    #[test]
    fn snapshot_eraser_paints_background() {
        let mut s = white();
        s.stroke_segment(Point::new(0.0, 50.0), Point::new(200.0, 50.0), RED, 10.0);
        let mut c = StrokeController::new(brush(RED), StrokeVariant::Snapshot);
        c.select_tool(Tool::Eraser);
        c.set_brush_width(12.0);
        c.pointer_down(&mut s, Point::new(100.0, 50.0));
        assert_eq!(s.frame().get(100, 50), Some(Color::WHITE.to_argb()));
        assert_eq!(s.frame().get(20, 50), Some(RED.to_argb()));
    }

    #[test]
    fn snapshot_variant_can_cancel() {
        let mut s = white();
        let before = s.snapshot();
        let mut c = StrokeController::new(brush(RED), StrokeVariant::Snapshot);
        c.pointer_down(&mut s, Point::new(20.0, 20.0));
        c.pointer_move(&mut s, Point::new(90.0, 90.0));
        assert_ne!(s.frame(), &before);

        assert!(c.cancel_stroke(&mut s));
        assert_eq!(s.frame(), &before);
        assert_eq!(c.state(), StrokeState::Idle);
        assert!(!c.cancel_stroke(&mut s));
    }

    #[test]
    fn snapshot_stroke_restarts_on_replaced_content() {
        let mut s = white();
        let mut c = StrokeController::new(brush(RED), StrokeVariant::Snapshot);
        c.pointer_down(&mut s, Point::new(20.0, 20.0));
        c.pointer_move(&mut s, Point::new(40.0, 20.0));

        // Content swapped mid-stroke.
        let blue = Color::rgb(0, 0, 255);
        s.fill_background(blue);
        c.rebase(&s);
        assert_eq!(c.state(), StrokeState::Drawing);

        c.pointer_move(&mut s, Point::new(80.0, 20.0));
        // The new content survives; the old stroke part is gone.
        assert_eq!(s.frame().get(150, 150), Some(blue.to_argb()));
        assert_eq!(s.frame().get(30, 20), Some(blue.to_argb()));
        assert_eq!(s.frame().get(60, 20), Some(RED.to_argb()));

        // Cancel now goes back to the swapped-in content.
        assert!(c.cancel_stroke(&mut s));
        assert!(s.frame().pixels.iter().all(|&p| p == blue.to_argb()));
    }

    #[test]
    fn rebase_is_a_no_op_when_idle_or_direct() {
        let mut s = white();
        let mut c = StrokeController::new(brush(RED), StrokeVariant::Snapshot);
        c.rebase(&s);
        assert_eq!(c.state(), StrokeState::Idle);

        let mut d = StrokeController::new(brush(RED), StrokeVariant::Direct);
        d.pointer_down(&mut s, Point::new(10.0, 10.0));
        d.rebase(&s);
        assert!(!d.cancel_stroke(&mut s));
    }

    #[test]
    fn direct_variant_cannot_cancel() {
        let mut s = white();
        let mut c = StrokeController::new(brush(RED), StrokeVariant::Direct);
        c.pointer_down(&mut s, Point::new(20.0, 20.0));
        assert!(!c.cancel_stroke(&mut s));
        assert_eq!(c.state(), StrokeState::Drawing);
    }
}
