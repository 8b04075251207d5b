// What you SEE:
// • A white canvas with the base avatar fitted into the middle-left box.
// • Hold Left Mouse to paint with the brush; E switches to the eraser, B back.
// • 1-4 swap outfits, C clears back to the base avatar.
// • Tab cycles swatches, P takes the --color pick, [ and ] change the brush size, 0 resets it.
// • U picks an image to stretch over the canvas, S saves a JPEG. ESC quits.

use avatar_canvas::config::Config;
use avatar_canvas::controller::{ERASER_SIZE, StrokeVariant};
use avatar_canvas::draw::{draw_hud, draw_tool_cursor, Drawer};
use avatar_canvas::error::Error;
use avatar_canvas::logger;
use avatar_canvas::session::Session;
use avatar_canvas::types::FrameBuffer;
use clap::Parser;
use std::time::Duration;

const STARTUP_LOAD_WAIT: Duration = Duration::from_millis(500);

fn main() -> Result<(), Error> {
    let config = Config::parse();
    if let Err(e) = logger::init(logger::level_for_verbosity(config.verbose)) {
        eprintln!("logger already set: {e}");
    }

    /* --- Window first, then a session sized to its client area ---
       Visual: window opens, canvas is white until the avatar decodes. */
    let mut drawer = Drawer::new("Avatar Canvas", config.width, config.height)?;
    let (w, h) = drawer.size();
    let mut session = Session::new(&config, w, h)?;
    log::info!("canvas {w}x{h}, variant {:?}", config.variant);
    // Give the base avatar a moment so the first frame is not bare white.
    session.wait_for_loads(STARTUP_LOAD_WAIT);

    /* --- Reusable screen buffer (0x00RRGGBB for minifb) --- */
    let mut screen = FrameBuffer::new(w, h, 0);

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Pointer input straight into the stroke controller. */
        for event in drawer.poll_pointer() {
            session.pointer(event);
        }

        /* 2) Tool buttons. Failures are logged; the canvas just stays as it was. */
        for action in drawer.poll_actions(config.upload.as_deref(), config.color) {
            if let Err(e) = session.apply(action) {
                log::error!("{e}");
            }
        }

        /* 3) Outfits/uploads that finished decoding replace the canvas now. */
        session.pump_loads();

        /* 4) Flatten, then overlays on top (never written into the surface). */
        session.render_into(&mut screen);
        let ctl = session.controller();
        if let Some(at) = drawer.cursor() {
            let sel = ctl.selection();
            // The snapshot eraser paints at brush width instead of clearing a square.
            let eraser = match ctl.variant() {
                StrokeVariant::Direct => ERASER_SIZE,
                StrokeVariant::Snapshot => sel.brush_width,
            };
            draw_tool_cursor(&mut screen, at, sel.tool, sel.brush_width, eraser);
        }
        draw_hud(&mut screen, ctl, session.manager().is_loading());

        /* 5) Present. */
        drawer.present(&screen)?;
    }

    Ok(())
}
