// One editing session: the surface manager, the stroke controller and the
// export settings, passed explicitly to every handler.
use crate::assets::{AssetCatalog, Outfit};
use crate::config::Config;
use crate::controller::{StrokeController, Tool, ToolSelection};
use crate::error::Error;
use crate::export;
use crate::manager::SurfaceManager;
use crate::types::{Color, FrameBuffer, Point};
use std::path::PathBuf;
use std::time::Duration;

/// Pointer input in surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
    Leave,
}

/// What the tool buttons ask for.
#[derive(Clone, Debug, PartialEq)]
pub enum UiAction {
    SelectTool(Tool),
    Outfit(Outfit),
    Clear,
    SetColor(Color),
    NextSwatch,
    SetBrushWidth(f32),
    AdjustBrushWidth(f32),
    Upload(PathBuf),
    Export,
    CancelStroke,
}

pub struct Session {
    manager: SurfaceManager,
    controller: StrokeController,
    export_dir: PathBuf,
    jpeg_quality: u8,
}

impl Session {
    /// Build a session for a container of `width`×`height` pixels.
    /// The window must exist first; its client size is the container.
    pub fn new(config: &Config, width: usize, height: usize) -> Result<Self, Error> {
        let catalog = AssetCatalog::new(&config.assets);
        log::info!("assets from {}", catalog.root().display());

        let mut manager = SurfaceManager::new(config.width, config.height, Color::WHITE, catalog)?;
        manager.resize_to_container(width, height);
        manager.fill_background(Color::WHITE);
        manager.load_outfit(Outfit::Base)?;

        let selection = ToolSelection {
            tool: Tool::Brush,
            brush_width: config.brush_width,
            color: config.color,
        };

        Ok(Self {
            manager,
            controller: StrokeController::new(selection, config.variant),
            export_dir: config.export_dir.clone(),
            jpeg_quality: config.quality,
        })
    }

    pub fn manager(&self) -> &SurfaceManager {
        &self.manager
    }

    pub fn controller(&self) -> &StrokeController {
        &self.controller
    }

    pub fn pointer(&mut self, event: PointerEvent) {
        let surface = self.manager.surface_mut();
        match event {
            PointerEvent::Down(p) => self.controller.pointer_down(surface, p),
            PointerEvent::Move(p) => self.controller.pointer_move(surface, p),
            PointerEvent::Up => self.controller.pointer_up(),
            PointerEvent::Leave => self.controller.pointer_leave(),
        }
    }

    /// Handle a tool button. Returns the export path when the action was `Export`.
    pub fn apply(&mut self, action: UiAction) -> Result<Option<PathBuf>, Error> {
        match action {
            UiAction::SelectTool(tool) => {
                log::debug!("tool {:?}", tool);
                self.controller.select_tool(tool);
            }
            UiAction::Outfit(outfit) => {
                self.manager.load_outfit(outfit)?;
            }
            UiAction::Clear => {
                self.manager.clear()?;
                self.controller.rebase(self.manager.surface());
            }
            UiAction::SetColor(color) => self.controller.set_color(color),
            UiAction::NextSwatch => self.controller.next_swatch(),
            UiAction::SetBrushWidth(width) => self.controller.set_brush_width(width),
            UiAction::AdjustBrushWidth(delta) => {
                let width = self.controller.selection().brush_width + delta;
                self.controller.set_brush_width(width);
            }
            UiAction::Upload(path) => {
                log::info!("uploading {}", path.display());
                self.manager.load_upload(path)?;
            }
            UiAction::Export => {
                let path = export::export_jpeg(self.manager.surface(), &self.export_dir, self.jpeg_quality)?;
                return Ok(Some(path));
            }
            UiAction::CancelStroke => {
                if !self.controller.cancel_stroke(self.manager.surface_mut()) {
                    log::debug!("no stroke to cancel");
                }
            }
        }
        Ok(None)
    }

    /// Apply finished image loads. Call once per frame.
    pub fn pump_loads(&mut self) -> bool {
        let changed = self.manager.pump();
        if changed {
            self.controller.rebase(self.manager.surface());
        }
        changed
    }

    /// Block up to `timeout` for the newest load and apply it.
    pub fn wait_for_loads(&mut self, timeout: Duration) -> bool {
        let changed = self.manager.pump_blocking(timeout);
        if changed {
            self.controller.rebase(self.manager.surface());
        }
        changed
    }

    /// Flattened view of the surface for the window.
    pub fn render_into(&self, screen: &mut FrameBuffer) {
        self.manager.surface().flatten_into(screen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{StrokeState, StrokeVariant};
    use clap::Parser;
    use image::{Rgba, RgbaImage};
    use std::path::Path;
    use tempfile::tempdir;

    const WAIT: Duration = Duration::from_secs(10);

    fn config(assets: &Path, export_dir: &Path, variant: &str) -> Config {
        Config::try_parse_from([
            "avatar-canvas",
            "--assets",
            assets.to_str().unwrap(),
            "--export-dir",
            export_dir.to_str().unwrap(),
            "--variant",
            variant,
            "--color",
            "#E02020",
        ])
        .unwrap()
    }

    #[test]
    fn starts_white_and_sized_to_container() {
        let dir = tempdir().unwrap();
        let session = Session::new(&config(dir.path(), dir.path(), "direct"), 320, 240).unwrap();
        let surface = session.manager().surface();
        assert_eq!((surface.width(), surface.height()), (320, 240));
        assert!(surface.frame().pixels.iter().all(|&p| p == Color::WHITE.to_argb()));
        assert_eq!(session.controller().selection().color, Color::rgb(0xE0, 0x20, 0x20));
    }

    #[test]
    fn pointer_events_drive_the_controller() {
        let dir = tempdir().unwrap();
        let mut session = Session::new(&config(dir.path(), dir.path(), "direct"), 200, 200).unwrap();

        session.pointer(PointerEvent::Down(Point::new(100.0, 100.0)));
        assert_eq!(session.controller().state(), StrokeState::Drawing);
        session.pointer(PointerEvent::Move(Point::new(120.0, 100.0)));
        assert_eq!(
            session.manager().surface().frame().get(110, 100),
            Some(Color::rgb(0xE0, 0x20, 0x20).to_argb())
        );
        session.pointer(PointerEvent::Leave);
        assert_eq!(session.controller().state(), StrokeState::Idle);
    }

    #[test]
    fn actions_update_selection() {
        let dir = tempdir().unwrap();
        let mut session = Session::new(&config(dir.path(), dir.path(), "snapshot"), 50, 50).unwrap();
        assert_eq!(session.controller().variant(), StrokeVariant::Snapshot);

        session.apply(UiAction::SelectTool(Tool::Eraser)).unwrap();
        session.apply(UiAction::SetBrushWidth(10.0)).unwrap();
        session.apply(UiAction::AdjustBrushWidth(2.0)).unwrap();
        session.apply(UiAction::SetColor(Color::BLACK)).unwrap();
        session.apply(UiAction::NextSwatch).unwrap();

        let sel = session.controller().selection();
        assert_eq!(sel.tool, Tool::Eraser);
        assert_eq!(sel.brush_width, 12.0);
        assert_eq!(sel.color, Color::rgb(0xE0, 0x20, 0x20));
    }

    #[test]
    fn cancel_restores_pre_stroke_surface() {
        let dir = tempdir().unwrap();
        let mut session = Session::new(&config(dir.path(), dir.path(), "snapshot"), 100, 100).unwrap();
        let before = session.manager().surface().snapshot();

        session.pointer(PointerEvent::Down(Point::new(10.0, 10.0)));
        session.pointer(PointerEvent::Move(Point::new(90.0, 90.0)));
        session.apply(UiAction::CancelStroke).unwrap();
        assert_eq!(session.manager().surface().frame(), &before);
    }

    #[test]
    fn export_writes_a_jpeg() {
        let dir = tempdir().unwrap();
        let mut session = Session::new(&config(dir.path(), dir.path(), "direct"), 64, 48).unwrap();
        let path = session.apply(UiAction::Export).unwrap().expect("export path");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jpg"));
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn default_outfit_arrives_after_startup() {
        let dir = tempdir().unwrap();
        RgbaImage::from_pixel(7, 10, Rgba([0, 0, 0, 255]))
            .save(dir.path().join(Outfit::Base.file_name()))
            .unwrap();
        let mut session = Session::new(&config(dir.path(), dir.path(), "direct"), 600, 700).unwrap();
        assert!(session.wait_for_loads(WAIT));
        // 7x10 portrait -> 350x500 fills the whole box at (200, 100)
        let frame = session.manager().surface().frame();
        assert_eq!(frame.get(375, 350), Some(Color::BLACK.to_argb()));
        assert_eq!(frame.get(100, 350), Some(0));

        let mut screen = FrameBuffer::new(1, 1, 0);
        session.render_into(&mut screen);
        assert_eq!(screen.get(100, 350), Some(0x00FF_FFFF));
    }

    #[test]
    fn outfit_arriving_mid_stroke_survives_next_move() {
        let dir = tempdir().unwrap();
        RgbaImage::from_pixel(70, 50, Rgba([0, 0, 255, 255]))
            .save(dir.path().join(Outfit::Shirt2.file_name()))
            .unwrap();
        let mut session = Session::new(&config(dir.path(), dir.path(), "snapshot"), 600, 700).unwrap();
        // The base outfit is missing; let that request resolve first.
        session.wait_for_loads(WAIT);

        session.pointer(PointerEvent::Down(Point::new(10.0, 10.0)));
        session.apply(UiAction::Outfit(Outfit::Shirt2)).unwrap();
        assert!(session.wait_for_loads(WAIT));
        let blue = Color::rgb(0, 0, 255).to_argb();
        assert_eq!(session.manager().surface().frame().get(375, 350), Some(blue));

        session.pointer(PointerEvent::Move(Point::new(20.0, 10.0)));
        let frame = session.manager().surface().frame();
        assert_eq!(frame.get(375, 350), Some(blue));
        // The stroke keeps going on top of the new outfit.
        assert_eq!(frame.get(15, 10), Some(Color::rgb(0xE0, 0x20, 0x20).to_argb()));
    }

    #[test]
    fn clear_mid_stroke_is_not_undone() {
        let dir = tempdir().unwrap();
        let mut session = Session::new(&config(dir.path(), dir.path(), "snapshot"), 100, 100).unwrap();

        session.pointer(PointerEvent::Down(Point::new(10.0, 50.0)));
        session.pointer(PointerEvent::Move(Point::new(90.0, 50.0)));
        session.apply(UiAction::Clear).unwrap();
        session.pointer(PointerEvent::Move(Point::new(90.0, 80.0)));

        let frame = session.manager().surface().frame();
        assert_eq!(frame.get(50, 50), Some(Color::WHITE.to_argb()));
        assert_eq!(frame.get(90, 65), Some(Color::rgb(0xE0, 0x20, 0x20).to_argb()));
    }
}
